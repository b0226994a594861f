//! Anymailfinder connector
//!
//! Email discovery and verification. Every request carries the API key as a
//! bearer token; searches can be slow, so each item gets a generous timeout
//! unless the caller overrides it.

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use url::Url;

use crate::connectors::catalog::{
    Catalog, OneOf, OperationDescriptor, Payload, RequestParts, ResourceDescriptor,
};
use crate::connectors::metadata::{AuthType, ConnectorMetadata};
use crate::connectors::{Connector, Registry};
use crate::credentials::{AuthPlacement, CredentialDescriptor, CredentialTest};
use crate::error::OperationError;
use crate::fields::{
    Condition, DefaultValue, DisplayOptions, FieldAccess, FieldDescriptor, FieldReader, FieldType,
    OptionValue,
};
use crate::http::HttpMethod;

pub const DEFAULT_BASE_URL: &str = "https://api.anymailfinder.com";

/// Per-request timeout applied when `additionalOptions.timeout` is unset
pub const DEFAULT_TIMEOUT_SECS: u64 = 180;

pub const WEBHOOK_HEADER: &str = "x-webhook-url";

pub const CREDENTIAL: CredentialDescriptor = CredentialDescriptor {
    name: "anymailFinderApi",
    display_name: "Anymailfinder API",
    documentation_url: "https://anymailfinder.com/email-finder-api/docs",
    placement: AuthPlacement::BearerHeader,
    test: CredentialTest {
        method: HttpMethod::Get,
        path: "/v5.0/meta/account.json",
    },
};

static METADATA: ConnectorMetadata = ConnectorMetadata {
    name: "anymailFinder",
    display_name: "Anymailfinder",
    description: "Find and verify email addresses using Anymailfinder API",
    auth_type: AuthType::Bearer,
    group: "transform",
    version: 1,
};

const COMPANY_IDENTIFIER: OneOf = OneOf {
    fields: &["domain", "companyName"],
    message: "Either domain or company name must be provided",
};

static RESOURCES: &[ResourceDescriptor] = &[
    ResourceDescriptor {
        name: "Account Info",
        value: "accountInfo",
    },
    ResourceDescriptor {
        name: "Company Email",
        value: "companyEmail",
    },
    ResourceDescriptor {
        name: "Decision Maker",
        value: "decisionMaker",
    },
    ResourceDescriptor {
        name: "Email Verification",
        value: "emailVerification",
    },
    ResourceDescriptor {
        name: "LinkedIn Email",
        value: "linkedinEmail",
    },
    ResourceDescriptor {
        name: "Person Email",
        value: "personEmail",
    },
];

static RESOURCE_OPTIONS: &[OptionValue] = &[
    OptionValue {
        name: "Account Info",
        value: "accountInfo",
    },
    OptionValue {
        name: "Company Email",
        value: "companyEmail",
    },
    OptionValue {
        name: "Decision Maker",
        value: "decisionMaker",
    },
    OptionValue {
        name: "Email Verification",
        value: "emailVerification",
    },
    OptionValue {
        name: "LinkedIn Email",
        value: "linkedinEmail",
    },
    OptionValue {
        name: "Person Email",
        value: "personEmail",
    },
];

static FIND_EMAIL: &[OptionValue] = &[OptionValue {
    name: "Find Email",
    value: "findEmail",
}];
static FIND_EMAILS: &[OptionValue] = &[OptionValue {
    name: "Find Emails",
    value: "findEmails",
}];
static VERIFY_EMAIL: &[OptionValue] = &[OptionValue {
    name: "Verify Email",
    value: "verifyEmail",
}];
static GET_INFO: &[OptionValue] = &[OptionValue {
    name: "Get Info",
    value: "getInfo",
}];

static NAME_INPUT_METHODS: &[OptionValue] = &[
    OptionValue {
        name: "Full Name",
        value: "fullName",
    },
    OptionValue {
        name: "First & Last Name",
        value: "firstLast",
    },
];

static DECISION_MAKER_CATEGORIES: &[OptionValue] = &[
    OptionValue {
        name: "CEO / Owner / President / Founder",
        value: "ceo",
    },
    OptionValue {
        name: "Engineering",
        value: "engineering",
    },
    OptionValue {
        name: "Finance",
        value: "finance",
    },
    OptionValue {
        name: "Human Resources (HR)",
        value: "hr",
    },
    OptionValue {
        name: "Information Technology (IT)",
        value: "it",
    },
    OptionValue {
        name: "Logistics",
        value: "logistics",
    },
    OptionValue {
        name: "Marketing",
        value: "marketing",
    },
    OptionValue {
        name: "Operations / Administration",
        value: "operations",
    },
];

static ADDITIONAL_OPTIONS: &[FieldDescriptor] = &[
    FieldDescriptor {
        name: "webhookUrl",
        display_name: "Webhook URL",
        description: "URL to receive a callback when the result is ready instead of waiting for the response",
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "timeout",
        display_name: "Timeout (seconds)",
        kind: FieldType::Number,
        default: DefaultValue::Int(DEFAULT_TIMEOUT_SECS as i64),
        description: "Request timeout in seconds",
        ..FieldDescriptor::BASE
    },
];

static FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor {
        name: "resource",
        display_name: "Resource",
        kind: FieldType::Options(RESOURCE_OPTIONS),
        default: DefaultValue::Str("personEmail"),
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "operation",
        display_name: "Operation",
        kind: FieldType::Options(FIND_EMAIL),
        default: DefaultValue::Str("findEmail"),
        display: DisplayOptions {
            show: &[&[Condition {
                field: "resource",
                values: &["personEmail", "decisionMaker", "linkedinEmail"],
            }]],
            hide: &[],
        },
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "operation",
        display_name: "Operation",
        kind: FieldType::Options(FIND_EMAILS),
        default: DefaultValue::Str("findEmails"),
        display: DisplayOptions {
            show: &[&[Condition {
                field: "resource",
                values: &["companyEmail"],
            }]],
            hide: &[],
        },
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "operation",
        display_name: "Operation",
        kind: FieldType::Options(VERIFY_EMAIL),
        default: DefaultValue::Str("verifyEmail"),
        display: DisplayOptions {
            show: &[&[Condition {
                field: "resource",
                values: &["emailVerification"],
            }]],
            hide: &[],
        },
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "operation",
        display_name: "Operation",
        kind: FieldType::Options(GET_INFO),
        default: DefaultValue::Str("getInfo"),
        display: DisplayOptions {
            show: &[&[Condition {
                field: "resource",
                values: &["accountInfo"],
            }]],
            hide: &[],
        },
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "nameInputMethod",
        display_name: "Name Input Method",
        kind: FieldType::Options(NAME_INPUT_METHODS),
        default: DefaultValue::Str("fullName"),
        description: "Choose how to provide the person's name",
        display: DisplayOptions {
            show: &[&[
                Condition {
                    field: "resource",
                    values: &["personEmail"],
                },
                Condition {
                    field: "operation",
                    values: &["findEmail"],
                },
            ]],
            hide: &[],
        },
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "fullName",
        display_name: "Full Name",
        required: true,
        description: "The full name of the person (e.g., \"John Doe\")",
        display: DisplayOptions {
            show: &[&[
                Condition {
                    field: "resource",
                    values: &["personEmail"],
                },
                Condition {
                    field: "operation",
                    values: &["findEmail"],
                },
                Condition {
                    field: "nameInputMethod",
                    values: &["fullName"],
                },
            ]],
            hide: &[],
        },
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "firstName",
        display_name: "First Name",
        required: true,
        display: DisplayOptions {
            show: &[&[
                Condition {
                    field: "resource",
                    values: &["personEmail"],
                },
                Condition {
                    field: "nameInputMethod",
                    values: &["firstLast"],
                },
            ]],
            hide: &[],
        },
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "lastName",
        display_name: "Last Name",
        required: true,
        display: DisplayOptions {
            show: &[&[
                Condition {
                    field: "resource",
                    values: &["personEmail"],
                },
                Condition {
                    field: "nameInputMethod",
                    values: &["firstLast"],
                },
            ]],
            hide: &[],
        },
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "domain",
        display_name: "Domain",
        description: "Company domain (e.g., \"microsoft.com\"). Use either domain or company name.",
        display: DisplayOptions {
            show: &[&[Condition {
                field: "resource",
                values: &["personEmail", "companyEmail", "decisionMaker"],
            }]],
            hide: &[],
        },
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "companyName",
        display_name: "Company Name",
        description: "Company name (e.g., \"Microsoft\"). Domain is preferred for better accuracy.",
        display: DisplayOptions {
            show: &[&[Condition {
                field: "resource",
                values: &["personEmail", "companyEmail", "decisionMaker"],
            }]],
            hide: &[],
        },
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "decisionMakerCategory",
        display_name: "Decision Maker Category",
        kind: FieldType::Options(DECISION_MAKER_CATEGORIES),
        default: DefaultValue::Str("ceo"),
        required: true,
        description: "The department or role category to search for",
        display: DisplayOptions {
            show: &[&[Condition {
                field: "resource",
                values: &["decisionMaker"],
            }]],
            hide: &[],
        },
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "linkedinUrl",
        display_name: "LinkedIn URL",
        required: true,
        description: "LinkedIn profile URL of the person",
        display: DisplayOptions {
            show: &[&[Condition {
                field: "resource",
                values: &["linkedinEmail"],
            }]],
            hide: &[],
        },
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "email",
        display_name: "Email",
        required: true,
        description: "Email address to verify",
        display: DisplayOptions {
            show: &[&[Condition {
                field: "resource",
                values: &["emailVerification"],
            }]],
            hide: &[],
        },
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "additionalOptions",
        display_name: "Additional Options",
        kind: FieldType::Collection(ADDITIONAL_OPTIONS),
        default: DefaultValue::EmptyCollection,
        display: DisplayOptions {
            show: &[&[Condition {
                field: "resource",
                values: &[
                    "personEmail",
                    "companyEmail",
                    "decisionMaker",
                    "linkedinEmail",
                    "emailVerification",
                ],
            }]],
            hide: &[],
        },
        ..FieldDescriptor::BASE
    },
];

static OPERATIONS: &[OperationDescriptor] = &[
    OperationDescriptor {
        resource: "personEmail",
        operation: "findEmail",
        name: "Find Email",
        description: "Find a person's email by name and company",
        method: HttpMethod::Post,
        path: "/v5.0/search/person.json",
        required_fields: &[],
        one_of: Some(COMPANY_IDENTIFIER),
        build: find_person_email,
    },
    OperationDescriptor {
        resource: "companyEmail",
        operation: "findEmails",
        name: "Find Emails",
        description: "Find all emails at a company (up to 20)",
        method: HttpMethod::Post,
        path: "/v5.1/find-email/company",
        required_fields: &[],
        one_of: Some(COMPANY_IDENTIFIER),
        build: find_company_emails,
    },
    OperationDescriptor {
        resource: "decisionMaker",
        operation: "findEmail",
        name: "Find Email",
        description: "Find decision maker's email",
        method: HttpMethod::Post,
        path: "/v5.0/search/decision-maker.json",
        required_fields: &["decisionMakerCategory"],
        one_of: Some(COMPANY_IDENTIFIER),
        build: find_decision_maker,
    },
    OperationDescriptor {
        resource: "linkedinEmail",
        operation: "findEmail",
        name: "Find Email",
        description: "Find email by LinkedIn profile URL",
        method: HttpMethod::Post,
        path: "/v5.0/search/linkedin-url.json",
        required_fields: &["linkedinUrl"],
        one_of: None,
        build: find_linkedin_email,
    },
    OperationDescriptor {
        resource: "emailVerification",
        operation: "verifyEmail",
        name: "Verify Email",
        description: "Verify if an email address is valid",
        method: HttpMethod::Post,
        path: "/v5.1/verify-email",
        required_fields: &["email"],
        one_of: None,
        build: verify_email,
    },
    OperationDescriptor {
        resource: "accountInfo",
        operation: "getInfo",
        name: "Get Info",
        description: "Get account details and remaining credits",
        method: HttpMethod::Get,
        path: "/v5.1/account",
        required_fields: &[],
        one_of: None,
        build: account_info,
    },
];

static CATALOG: LazyLock<Catalog> = LazyLock::new(|| Catalog::new(RESOURCES, OPERATIONS));

fn company_identifier(reader: &FieldReader<'_>, body: &mut Payload) -> Result<(), OperationError> {
    body.set_opt("domain", reader.string("domain")?)
        .set_opt("company_name", reader.string("companyName")?);
    Ok(())
}

fn find_person_email(reader: &FieldReader<'_>) -> Result<RequestParts, OperationError> {
    let mut body = Payload::new();
    match reader.string("nameInputMethod")?.as_deref() {
        None | Some("fullName") => {
            body.set("full_name", reader.required_string("fullName")?);
        }
        Some("firstLast") => {
            body.set("first_name", reader.required_string("firstName")?)
                .set("last_name", reader.required_string("lastName")?);
        }
        Some(other) => {
            return Err(OperationError::invalid_parameter(
                "nameInputMethod",
                format!("unknown name input method '{}'", other),
            ));
        }
    }
    company_identifier(reader, &mut body)?;
    Ok(RequestParts::with_body(body.into_value()))
}

fn find_company_emails(reader: &FieldReader<'_>) -> Result<RequestParts, OperationError> {
    let mut body = Payload::new();
    company_identifier(reader, &mut body)?;
    Ok(RequestParts::with_body(body.into_value()))
}

fn find_decision_maker(reader: &FieldReader<'_>) -> Result<RequestParts, OperationError> {
    let category = reader.required_string("decisionMakerCategory")?;
    if !DECISION_MAKER_CATEGORIES.iter().any(|c| c.value == category) {
        return Err(OperationError::invalid_parameter(
            "decisionMakerCategory",
            format!("unknown category '{}'", category),
        ));
    }
    let mut body = Payload::new();
    body.set("decision_maker_category", category);
    company_identifier(reader, &mut body)?;
    Ok(RequestParts::with_body(body.into_value()))
}

fn find_linkedin_email(reader: &FieldReader<'_>) -> Result<RequestParts, OperationError> {
    let mut body = Payload::new();
    body.set("linkedin_url", reader.required_string("linkedinUrl")?);
    Ok(RequestParts::with_body(body.into_value()))
}

fn verify_email(reader: &FieldReader<'_>) -> Result<RequestParts, OperationError> {
    let mut body = Payload::new();
    body.set("email", reader.required_string("email")?);
    Ok(RequestParts::with_body(body.into_value()))
}

fn account_info(_reader: &FieldReader<'_>) -> Result<RequestParts, OperationError> {
    Ok(RequestParts::empty())
}

/// Anymailfinder email finding and verification connector
#[derive(Debug, Clone)]
pub struct AnymailFinderConnector {
    base_url: Url,
}

impl AnymailFinderConnector {
    pub fn new(base_url: Url) -> Self {
        Self { base_url }
    }
}

impl Connector for AnymailFinderConnector {
    fn metadata(&self) -> &ConnectorMetadata {
        &METADATA
    }

    fn credential(&self) -> &'static CredentialDescriptor {
        &CREDENTIAL
    }

    fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn fields(&self) -> &'static [FieldDescriptor] {
        FIELDS
    }

    fn catalog(&self) -> &Catalog {
        &CATALOG
    }

    /// `additionalOptions` applies to every operation: a timeout (180s unless
    /// set to a positive value) and an optional callback webhook header.
    fn request_defaults(&self, reader: &FieldReader<'_>) -> Result<RequestParts, OperationError> {
        let options = reader.collection("additionalOptions")?;
        let timeout = options
            .integer("timeout")?
            .filter(|secs| *secs > 0)
            .map(|secs| secs as u64)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let mut parts = RequestParts {
            timeout: Some(Duration::from_secs(timeout)),
            ..RequestParts::empty()
        };
        if let Some(webhook) = options.string("webhookUrl")? {
            parts.headers.push((WEBHOOK_HEADER.to_string(), webhook));
        }
        Ok(parts)
    }
}

/// Register the Anymailfinder connector with the registry
pub fn register_anymailfinder_connector(
    registry: &mut Registry,
    connector: Arc<AnymailFinderConnector>,
) {
    registry.register(connector);
}
