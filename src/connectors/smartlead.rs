//! Smartlead connector
//!
//! Cold-email campaign management: campaigns, leads, sending accounts,
//! statistics, the master inbox, webhooks and agency clients. The API key
//! travels as the `api_key` query parameter on every request.
//!
//! Operations with a structured body also accept a raw JSON body through
//! `jsonParameters` / `bodyJson`.

use std::sync::{Arc, LazyLock};

use chrono::{DateTime, NaiveDate, NaiveTime};
use serde_json::Value;
use url::Url;

use crate::connectors::catalog::{
    BODY_JSON, Catalog, JSON_PARAMETERS, OperationDescriptor, Payload, RequestParts,
    ResourceDescriptor, json_or_fields,
};
use crate::connectors::metadata::{AuthType, ConnectorMetadata};
use crate::connectors::{Connector, Registry};
use crate::credentials::{AuthPlacement, CredentialDescriptor, CredentialTest};
use crate::error::OperationError;
use crate::fields::{
    Collection, Condition, DefaultValue, DisplayOptions, FieldAccess, FieldDescriptor,
    FieldReader, FieldType, OptionValue,
};
use crate::http::HttpMethod;

pub const DEFAULT_BASE_URL: &str = "https://server.smartlead.ai/api/v1";

/// Smartlead rejects lead uploads larger than this
pub const MAX_LEADS_PER_REQUEST: usize = 100;

pub const CREDENTIAL: CredentialDescriptor = CredentialDescriptor {
    name: "smartleadApi",
    display_name: "Smartlead API",
    documentation_url: "https://help.smartlead.ai/API-Documentation-a0d223bdd3154a77b3735497aad9419f",
    placement: AuthPlacement::QueryParameter("api_key"),
    test: CredentialTest {
        method: HttpMethod::Get,
        path: "/campaigns",
    },
};

static METADATA: ConnectorMetadata = ConnectorMetadata {
    name: "smartlead",
    display_name: "Smartlead",
    description: "Interact with the Smartlead.ai API",
    auth_type: AuthType::ApiKeyQuery,
    group: "transform",
    version: 1,
};

/// Shown for the listed operations of each resource
macro_rules! shown_for {
    ($($resource:literal => [$($operation:literal),* $(,)?]),+ $(,)?) => {
        DisplayOptions {
            show: &[$(&[
                Condition { field: "resource", values: &[$resource] },
                Condition { field: "operation", values: &[$($operation),*] },
            ]),+],
            hide: &[],
        }
    };
}

/// Like `shown_for!`, but hidden while the raw JSON body is in use
macro_rules! structured_for {
    ($($resource:literal => [$($operation:literal),* $(,)?]),+ $(,)?) => {
        DisplayOptions {
            show: &[$(&[
                Condition { field: "resource", values: &[$resource] },
                Condition { field: "operation", values: &[$($operation),*] },
            ]),+],
            hide: &[&[Condition { field: JSON_PARAMETERS, values: &["true"] }]],
        }
    };
}

/// Shown only while the raw JSON body is in use
macro_rules! raw_json_for {
    ($($resource:literal => [$($operation:literal),* $(,)?]),+ $(,)?) => {
        DisplayOptions {
            show: &[$(&[
                Condition { field: "resource", values: &[$resource] },
                Condition { field: "operation", values: &[$($operation),*] },
                Condition { field: JSON_PARAMETERS, values: &["true"] },
            ]),+],
            hide: &[],
        }
    };
}

static RESOURCES: &[ResourceDescriptor] = &[
    ResourceDescriptor {
        name: "Campaign",
        value: "campaign",
    },
    ResourceDescriptor {
        name: "Campaign Statistic",
        value: "campaignStatistics",
    },
    ResourceDescriptor {
        name: "Client",
        value: "client",
    },
    ResourceDescriptor {
        name: "Email Account",
        value: "emailAccount",
    },
    ResourceDescriptor {
        name: "Lead",
        value: "lead",
    },
    ResourceDescriptor {
        name: "Master Inbox",
        value: "masterInbox",
    },
    ResourceDescriptor {
        name: "Webhook",
        value: "webhook",
    },
];

static RESOURCE_OPTIONS: &[OptionValue] = &[
    OptionValue {
        name: "Campaign",
        value: "campaign",
    },
    OptionValue {
        name: "Campaign Statistic",
        value: "campaignStatistics",
    },
    OptionValue {
        name: "Client",
        value: "client",
    },
    OptionValue {
        name: "Email Account",
        value: "emailAccount",
    },
    OptionValue {
        name: "Lead",
        value: "lead",
    },
    OptionValue {
        name: "Master Inbox",
        value: "masterInbox",
    },
    OptionValue {
        name: "Webhook",
        value: "webhook",
    },
];

static CAMPAIGN_STATUSES: &[OptionValue] = &[
    OptionValue {
        name: "Pause",
        value: "PAUSED",
    },
    OptionValue {
        name: "Stop",
        value: "STOPPED",
    },
    OptionValue {
        name: "Start",
        value: "START",
    },
];

static STOP_LEAD_SETTINGS: &[OptionValue] = &[
    OptionValue {
        name: "Reply To An Email",
        value: "REPLY_TO_AN_EMAIL",
    },
    OptionValue {
        name: "Click On A Link",
        value: "CLICK_ON_A_LINK",
    },
    OptionValue {
        name: "Open An Email",
        value: "OPEN_AN_EMAIL",
    },
];

static EMAIL_STATUSES: &[OptionValue] = &[
    OptionValue {
        name: "Opened",
        value: "opened",
    },
    OptionValue {
        name: "Clicked",
        value: "clicked",
    },
    OptionValue {
        name: "Replied",
        value: "replied",
    },
    OptionValue {
        name: "Unsubscribed",
        value: "unsubscribed",
    },
    OptionValue {
        name: "Bounced",
        value: "bounced",
    },
];

static CAMPAIGN_SETTINGS: &[FieldDescriptor] = &[
    FieldDescriptor {
        name: "trackSettings",
        display_name: "Track Settings",
        description: "Comma-separated tracking switches, e.g. DONT_TRACK_EMAIL_OPEN",
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "stopLeadSettings",
        display_name: "Stop Lead On",
        kind: FieldType::Options(STOP_LEAD_SETTINGS),
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "unsubscribeText",
        display_name: "Unsubscribe Text",
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "sendAsPlainText",
        display_name: "Send As Plain Text",
        kind: FieldType::Boolean,
        default: DefaultValue::Bool(false),
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "followUpPercentage",
        display_name: "Follow Up Percentage",
        kind: FieldType::Number,
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "clientId",
        display_name: "Client ID",
        kind: FieldType::Number,
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "enableAiEspMatching",
        display_name: "Enable AI ESP Matching",
        kind: FieldType::Boolean,
        default: DefaultValue::Bool(false),
        ..FieldDescriptor::BASE
    },
];

static LEAD_SETTINGS: &[FieldDescriptor] = &[
    FieldDescriptor {
        name: "ignoreGlobalBlockList",
        display_name: "Ignore Global Block List",
        kind: FieldType::Boolean,
        default: DefaultValue::Bool(false),
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "ignoreUnsubscribeList",
        display_name: "Ignore Unsubscribe List",
        kind: FieldType::Boolean,
        default: DefaultValue::Bool(false),
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "ignoreDuplicateLeadsInOtherCampaign",
        display_name: "Ignore Duplicate Leads In Other Campaigns",
        kind: FieldType::Boolean,
        default: DefaultValue::Bool(false),
        ..FieldDescriptor::BASE
    },
];

static LEAD_UPDATE_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor {
        name: "email",
        display_name: "Email",
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "firstName",
        display_name: "First Name",
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "lastName",
        display_name: "Last Name",
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "phoneNumber",
        display_name: "Phone Number",
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "companyName",
        display_name: "Company Name",
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "website",
        display_name: "Website",
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "location",
        display_name: "Location",
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "linkedinProfile",
        display_name: "LinkedIn Profile",
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "companyUrl",
        display_name: "Company URL",
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "customFields",
        display_name: "Custom Fields",
        kind: FieldType::Json,
        ..FieldDescriptor::BASE
    },
];

static ACCOUNT_OPTIONS: &[FieldDescriptor] = &[
    FieldDescriptor {
        name: "maxEmailPerDay",
        display_name: "Max Emails Per Day",
        kind: FieldType::Number,
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "customTrackingUrl",
        display_name: "Custom Tracking URL",
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "bcc",
        display_name: "BCC",
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "signature",
        display_name: "Signature",
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "warmupEnabled",
        display_name: "Warmup Enabled",
        kind: FieldType::Boolean,
        default: DefaultValue::Bool(false),
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "totalWarmupPerDay",
        display_name: "Total Warmup Per Day",
        kind: FieldType::Number,
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "dailyRampup",
        display_name: "Daily Rampup",
        kind: FieldType::Number,
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "replyRatePercentage",
        display_name: "Reply Rate Percentage",
        kind: FieldType::Number,
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "clientId",
        display_name: "Client ID",
        kind: FieldType::Number,
        ..FieldDescriptor::BASE
    },
];

static ACCOUNT_UPDATE_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor {
        name: "maxEmailPerDay",
        display_name: "Max Emails Per Day",
        kind: FieldType::Number,
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "customTrackingUrl",
        display_name: "Custom Tracking URL",
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "bcc",
        display_name: "BCC",
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "signature",
        display_name: "Signature",
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "clientId",
        display_name: "Client ID",
        kind: FieldType::Number,
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "timeToWaitInMins",
        display_name: "Minutes Between Emails",
        kind: FieldType::Number,
        ..FieldDescriptor::BASE
    },
];

static WARMUP_OPTIONS: &[FieldDescriptor] = &[
    FieldDescriptor {
        name: "totalWarmupPerDay",
        display_name: "Total Warmup Per Day",
        kind: FieldType::Number,
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "dailyRampup",
        display_name: "Daily Rampup",
        kind: FieldType::Number,
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "replyRatePercentage",
        display_name: "Reply Rate Percentage",
        kind: FieldType::Number,
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "warmupKeyId",
        display_name: "Warmup Key ID",
        ..FieldDescriptor::BASE
    },
];

static STATISTICS_FILTERS: &[FieldDescriptor] = &[
    FieldDescriptor {
        name: "offset",
        display_name: "Offset",
        kind: FieldType::Number,
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "limit",
        display_name: "Limit",
        kind: FieldType::Number,
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "emailSequenceNumber",
        display_name: "Email Sequence Number",
        kind: FieldType::Number,
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "emailStatus",
        display_name: "Email Status",
        kind: FieldType::Options(EMAIL_STATUSES),
        ..FieldDescriptor::BASE
    },
];

static REPLY_OPTIONS: &[FieldDescriptor] = &[
    FieldDescriptor {
        name: "replyMessageId",
        display_name: "Reply Message ID",
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "replyEmailTime",
        display_name: "Reply Email Time",
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "replyEmailBody",
        display_name: "Reply Email Body",
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "cc",
        display_name: "CC",
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "bcc",
        display_name: "BCC",
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "addSignature",
        display_name: "Add Signature",
        kind: FieldType::Boolean,
        default: DefaultValue::Bool(true),
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "toFirstName",
        display_name: "To First Name",
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "toLastName",
        display_name: "To Last Name",
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "toEmail",
        display_name: "To Email",
        ..FieldDescriptor::BASE
    },
];

static FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor {
        name: "resource",
        display_name: "Resource",
        kind: FieldType::Options(RESOURCE_OPTIONS),
        default: DefaultValue::Str("campaign"),
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "operation",
        display_name: "Operation Name or ID",
        kind: FieldType::DynamicOptions,
        required: true,
        description: "Choose from the list, or specify an ID using an expression",
        ..FieldDescriptor::BASE
    },
    // common identifiers
    FieldDescriptor {
        name: "campaignId",
        display_name: "Campaign ID",
        required: true,
        description: "The ID of the campaign",
        display: DisplayOptions {
            show: &[
                &[
                    Condition {
                        field: "resource",
                        values: &["campaign"],
                    },
                    Condition {
                        field: "operation",
                        values: &[
                            "addEmailAccount",
                            "delete",
                            "get",
                            "getEmailAccounts",
                            "getSequences",
                            "removeEmailAccount",
                            "saveSequence",
                            "updateSchedule",
                            "updateSettings",
                            "updateStatus",
                        ],
                    },
                ],
                &[
                    Condition {
                        field: "resource",
                        values: &["lead"],
                    },
                    Condition {
                        field: "operation",
                        values: &[
                            "addToCampaign",
                            "deleteFromCampaign",
                            "listAllByCampaign",
                            "pauseInCampaign",
                            "resumeInCampaign",
                            "unsubscribeFromCampaign",
                            "update",
                            "updateCategory",
                        ],
                    },
                ],
                &[Condition {
                    field: "resource",
                    values: &["campaignStatistics", "masterInbox", "webhook"],
                }],
            ],
            hide: &[],
        },
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "leadId",
        display_name: "Lead ID",
        required: true,
        description: "The ID of the lead",
        display: shown_for!(
            "lead" => [
                "deleteFromCampaign",
                "getCampaigns",
                "pauseInCampaign",
                "resumeInCampaign",
                "unsubscribeFromAll",
                "unsubscribeFromCampaign",
                "update",
                "updateCategory",
            ],
            "masterInbox" => ["getMessageHistory"],
        ),
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "accountId",
        display_name: "Email Account ID",
        required: true,
        description: "The ID of the email account",
        display: shown_for!("emailAccount" => ["get", "update", "updateWarmup", "getWarmupStats"]),
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "leadLimit",
        display_name: "Limit",
        kind: FieldType::Number,
        default: DefaultValue::Int(50),
        description: "Max number of results to return",
        display: shown_for!("lead" => ["listAllByCampaign"]),
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "leadOffset",
        display_name: "Offset",
        kind: FieldType::Number,
        default: DefaultValue::Int(0),
        description: "The starting index for pagination",
        display: shown_for!("lead" => ["listAllByCampaign"]),
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "emailAccountLimit",
        display_name: "Limit",
        kind: FieldType::Number,
        default: DefaultValue::Int(50),
        description: "Max number of results to return",
        display: shown_for!("emailAccount" => ["getAll"]),
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "emailAccountOffset",
        display_name: "Offset",
        kind: FieldType::Number,
        default: DefaultValue::Int(0),
        description: "The starting index for pagination",
        display: shown_for!("emailAccount" => ["getAll"]),
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: JSON_PARAMETERS,
        display_name: "JSON Parameters",
        kind: FieldType::Boolean,
        default: DefaultValue::Bool(false),
        description: "Send the request body as raw JSON instead of individual fields",
        display: shown_for!(
            "campaign" => ["updateSchedule", "updateSettings"],
            "lead" => ["update"],
            "emailAccount" => ["create", "update", "updateWarmup"],
            "masterInbox" => ["replyToThread"],
            "webhook" => ["upsert"],
        ),
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: BODY_JSON,
        display_name: "Body (JSON)",
        kind: FieldType::Json,
        required: true,
        display: raw_json_for!(
            "campaign" => ["updateSchedule", "updateSettings"],
            "lead" => ["update"],
            "emailAccount" => ["create", "update", "updateWarmup"],
            "masterInbox" => ["replyToThread"],
            "webhook" => ["upsert"],
        ),
        ..FieldDescriptor::BASE
    },
    // campaign
    FieldDescriptor {
        name: "campaignName",
        display_name: "Campaign Name",
        required: true,
        description: "The name of the new campaign",
        display: shown_for!("campaign" => ["create"]),
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "clientId",
        display_name: "Client ID",
        kind: FieldType::Number,
        default: DefaultValue::Int(0),
        description: "The ID of the client to associate with (optional)",
        display: shown_for!("campaign" => ["create"], "lead" => ["addToGlobalBlockList"]),
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "emailAccountIds",
        display_name: "Email Account IDs",
        required: true,
        description: "Comma-separated list of email account IDs",
        display: shown_for!("campaign" => ["addEmailAccount", "removeEmailAccount"]),
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "sequences",
        display_name: "Sequences",
        kind: FieldType::Json,
        required: true,
        description: "JSON array of sequence steps",
        display: shown_for!("campaign" => ["saveSequence"]),
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "status",
        display_name: "Status",
        kind: FieldType::Options(CAMPAIGN_STATUSES),
        required: true,
        display: shown_for!("campaign" => ["updateStatus"]),
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "timezone",
        display_name: "Timezone",
        required: true,
        description: "IANA timezone, e.g. America/New_York",
        display: structured_for!("campaign" => ["updateSchedule"]),
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "daysOfTheWeek",
        display_name: "Days Of The Week",
        default: DefaultValue::Str("1,2,3,4,5"),
        description: "Comma-separated day numbers, 0 = Sunday",
        display: structured_for!("campaign" => ["updateSchedule"]),
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "startHour",
        display_name: "Start Hour",
        default: DefaultValue::Str("09:00"),
        description: "Sending window start, HH:MM",
        display: structured_for!("campaign" => ["updateSchedule"]),
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "endHour",
        display_name: "End Hour",
        default: DefaultValue::Str("18:00"),
        description: "Sending window end, HH:MM",
        display: structured_for!("campaign" => ["updateSchedule"]),
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "minTimeBetweenEmails",
        display_name: "Minutes Between Emails",
        kind: FieldType::Number,
        default: DefaultValue::Int(10),
        display: structured_for!("campaign" => ["updateSchedule"]),
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "maxNewLeadsPerDay",
        display_name: "Max New Leads Per Day",
        kind: FieldType::Number,
        default: DefaultValue::Int(20),
        display: structured_for!("campaign" => ["updateSchedule"]),
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "scheduleStartTime",
        display_name: "Schedule Start Time",
        description: "RFC 3339 timestamp the schedule becomes active",
        display: structured_for!("campaign" => ["updateSchedule"]),
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "settings",
        display_name: "Settings",
        kind: FieldType::Collection(CAMPAIGN_SETTINGS),
        default: DefaultValue::EmptyCollection,
        display: structured_for!("campaign" => ["updateSettings"]),
        ..FieldDescriptor::BASE
    },
    // lead
    FieldDescriptor {
        name: "leadList",
        display_name: "Lead List",
        kind: FieldType::Json,
        required: true,
        description: "JSON array of lead objects, at most 100",
        display: shown_for!("lead" => ["addToCampaign"]),
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "leadSettings",
        display_name: "Settings",
        kind: FieldType::Collection(LEAD_SETTINGS),
        default: DefaultValue::EmptyCollection,
        display: shown_for!("lead" => ["addToCampaign"]),
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "domainBlockList",
        display_name: "Domains",
        required: true,
        description: "Comma-separated list of domains or emails to block",
        display: shown_for!("lead" => ["addToGlobalBlockList"]),
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "email",
        display_name: "Email",
        required: true,
        display: shown_for!("lead" => ["getByEmail"]),
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "resumeDelayDays",
        display_name: "Resume Delay (Days)",
        kind: FieldType::Number,
        default: DefaultValue::Int(0),
        display: shown_for!("lead" => ["resumeInCampaign"]),
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "categoryId",
        display_name: "Category ID",
        kind: FieldType::Number,
        required: true,
        display: shown_for!("lead" => ["updateCategory"]),
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "pauseLead",
        display_name: "Pause Lead",
        kind: FieldType::Boolean,
        default: DefaultValue::Bool(false),
        display: shown_for!("lead" => ["updateCategory"]),
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "leadFields",
        display_name: "Update Fields",
        kind: FieldType::Collection(LEAD_UPDATE_FIELDS),
        default: DefaultValue::EmptyCollection,
        display: structured_for!("lead" => ["update"]),
        ..FieldDescriptor::BASE
    },
    // email account
    FieldDescriptor {
        name: "fromName",
        display_name: "From Name",
        required: true,
        display: structured_for!("emailAccount" => ["create"]),
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "fromEmail",
        display_name: "From Email",
        required: true,
        display: structured_for!("emailAccount" => ["create"]),
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "userName",
        display_name: "Username",
        required: true,
        display: structured_for!("emailAccount" => ["create"]),
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "password",
        display_name: "Password",
        required: true,
        display: structured_for!("emailAccount" => ["create"]),
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "smtpHost",
        display_name: "SMTP Host",
        required: true,
        display: structured_for!("emailAccount" => ["create"]),
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "smtpPort",
        display_name: "SMTP Port",
        kind: FieldType::Number,
        default: DefaultValue::Int(587),
        required: true,
        display: structured_for!("emailAccount" => ["create"]),
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "imapHost",
        display_name: "IMAP Host",
        required: true,
        display: structured_for!("emailAccount" => ["create"]),
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "imapPort",
        display_name: "IMAP Port",
        kind: FieldType::Number,
        default: DefaultValue::Int(993),
        required: true,
        display: structured_for!("emailAccount" => ["create"]),
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "accountOptions",
        display_name: "Additional Fields",
        kind: FieldType::Collection(ACCOUNT_OPTIONS),
        default: DefaultValue::EmptyCollection,
        display: structured_for!("emailAccount" => ["create"]),
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "accountUpdateFields",
        display_name: "Update Fields",
        kind: FieldType::Collection(ACCOUNT_UPDATE_FIELDS),
        default: DefaultValue::EmptyCollection,
        display: structured_for!("emailAccount" => ["update"]),
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "warmupEnabled",
        display_name: "Warmup Enabled",
        kind: FieldType::Boolean,
        default: DefaultValue::Bool(true),
        display: structured_for!("emailAccount" => ["updateWarmup"]),
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "warmupOptions",
        display_name: "Warmup Options",
        kind: FieldType::Collection(WARMUP_OPTIONS),
        default: DefaultValue::EmptyCollection,
        display: structured_for!("emailAccount" => ["updateWarmup"]),
        ..FieldDescriptor::BASE
    },
    // campaign statistics
    FieldDescriptor {
        name: "statisticsFilters",
        display_name: "Filters",
        kind: FieldType::Collection(STATISTICS_FILTERS),
        default: DefaultValue::EmptyCollection,
        display: shown_for!("campaignStatistics" => ["get"]),
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "startDate",
        display_name: "Start Date",
        required: true,
        description: "YYYY-MM-DD",
        display: shown_for!("campaignStatistics" => ["getByDateRange"]),
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "endDate",
        display_name: "End Date",
        required: true,
        description: "YYYY-MM-DD",
        display: shown_for!("campaignStatistics" => ["getByDateRange"]),
        ..FieldDescriptor::BASE
    },
    // master inbox
    FieldDescriptor {
        name: "emailStatsId",
        display_name: "Email Stats ID",
        required: true,
        description: "ID of the message being replied to, from the message history",
        display: structured_for!("masterInbox" => ["replyToThread"]),
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "emailBody",
        display_name: "Email Body",
        required: true,
        display: structured_for!("masterInbox" => ["replyToThread"]),
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "replyOptions",
        display_name: "Additional Fields",
        kind: FieldType::Collection(REPLY_OPTIONS),
        default: DefaultValue::EmptyCollection,
        display: structured_for!("masterInbox" => ["replyToThread"]),
        ..FieldDescriptor::BASE
    },
    // webhook
    FieldDescriptor {
        name: "webhookId",
        display_name: "Webhook ID",
        kind: FieldType::Number,
        description: "Leave empty on upsert to create a new webhook",
        display: DisplayOptions {
            show: &[
                &[
                    Condition {
                        field: "resource",
                        values: &["webhook"],
                    },
                    Condition {
                        field: "operation",
                        values: &["upsert"],
                    },
                ],
                &[
                    Condition {
                        field: "resource",
                        values: &["webhook"],
                    },
                    Condition {
                        field: "operation",
                        values: &["delete"],
                    },
                ],
            ],
            hide: &[&[
                Condition {
                    field: "operation",
                    values: &["upsert"],
                },
                Condition {
                    field: JSON_PARAMETERS,
                    values: &["true"],
                },
            ]],
        },
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "webhookName",
        display_name: "Name",
        required: true,
        display: structured_for!("webhook" => ["upsert"]),
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "webhookUrl",
        display_name: "Webhook URL",
        required: true,
        display: structured_for!("webhook" => ["upsert"]),
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "eventTypes",
        display_name: "Event Types",
        required: true,
        description: "Comma-separated, e.g. EMAIL_SENT, EMAIL_REPLY, LEAD_UNSUBSCRIBED",
        display: structured_for!("webhook" => ["upsert"]),
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "categories",
        display_name: "Categories",
        description: "Comma-separated lead categories that trigger the webhook",
        display: structured_for!("webhook" => ["upsert"]),
        ..FieldDescriptor::BASE
    },
    // client
    FieldDescriptor {
        name: "clientName",
        display_name: "Name",
        required: true,
        display: shown_for!("client" => ["create"]),
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "clientEmail",
        display_name: "Email",
        required: true,
        display: shown_for!("client" => ["create"]),
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "permission",
        display_name: "Permissions",
        default: DefaultValue::Str("reply_master_inbox"),
        description: "Comma-separated permissions, or full_access",
        display: shown_for!("client" => ["create"]),
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "logo",
        display_name: "Logo",
        display: shown_for!("client" => ["create"]),
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "logoUrl",
        display_name: "Logo URL",
        display: shown_for!("client" => ["create"]),
        ..FieldDescriptor::BASE
    },
    FieldDescriptor {
        name: "clientPassword",
        display_name: "Password",
        display: shown_for!("client" => ["create"]),
        ..FieldDescriptor::BASE
    },
];

static OPERATIONS: &[OperationDescriptor] = &[
    // campaign
    OperationDescriptor {
        resource: "campaign",
        operation: "addEmailAccount",
        name: "Add Email Account",
        description: "Attach sending accounts to a campaign",
        method: HttpMethod::Post,
        path: "/campaigns/{campaignId}/email-accounts",
        required_fields: &["emailAccountIds"],
        one_of: None,
        build: email_account_ids,
    },
    OperationDescriptor {
        resource: "campaign",
        operation: "create",
        name: "Create",
        description: "Create a campaign",
        method: HttpMethod::Post,
        path: "/campaigns/create",
        required_fields: &["campaignName"],
        one_of: None,
        build: create_campaign,
    },
    OperationDescriptor {
        resource: "campaign",
        operation: "delete",
        name: "Delete",
        description: "Delete a campaign",
        method: HttpMethod::Delete,
        path: "/campaigns/{campaignId}",
        required_fields: &[],
        one_of: None,
        build: no_body,
    },
    OperationDescriptor {
        resource: "campaign",
        operation: "get",
        name: "Get",
        description: "Get a campaign",
        method: HttpMethod::Get,
        path: "/campaigns/{campaignId}",
        required_fields: &[],
        one_of: None,
        build: no_body,
    },
    OperationDescriptor {
        resource: "campaign",
        operation: "getEmailAccounts",
        name: "Get Email Accounts",
        description: "List the sending accounts of a campaign",
        method: HttpMethod::Get,
        path: "/campaigns/{campaignId}/email-accounts",
        required_fields: &[],
        one_of: None,
        build: no_body,
    },
    OperationDescriptor {
        resource: "campaign",
        operation: "getAll",
        name: "Get Many",
        description: "List all campaigns",
        method: HttpMethod::Get,
        path: "/campaigns",
        required_fields: &[],
        one_of: None,
        build: no_body,
    },
    OperationDescriptor {
        resource: "campaign",
        operation: "getSequences",
        name: "Get Sequences",
        description: "Get the email sequence of a campaign",
        method: HttpMethod::Get,
        path: "/campaigns/{campaignId}/sequences",
        required_fields: &[],
        one_of: None,
        build: no_body,
    },
    OperationDescriptor {
        resource: "campaign",
        operation: "removeEmailAccount",
        name: "Remove Email Account",
        description: "Detach sending accounts from a campaign",
        method: HttpMethod::Delete,
        path: "/campaigns/{campaignId}/email-accounts",
        required_fields: &["emailAccountIds"],
        one_of: None,
        build: email_account_ids,
    },
    OperationDescriptor {
        resource: "campaign",
        operation: "saveSequence",
        name: "Save Sequence",
        description: "Replace the email sequence of a campaign",
        method: HttpMethod::Post,
        path: "/campaigns/{campaignId}/sequences",
        required_fields: &["sequences"],
        one_of: None,
        build: save_sequence,
    },
    OperationDescriptor {
        resource: "campaign",
        operation: "updateSchedule",
        name: "Update Schedule",
        description: "Update the sending schedule of a campaign",
        method: HttpMethod::Post,
        path: "/campaigns/{campaignId}/schedule",
        required_fields: &[],
        one_of: None,
        build: update_schedule,
    },
    OperationDescriptor {
        resource: "campaign",
        operation: "updateSettings",
        name: "Update Settings",
        description: "Update the general settings of a campaign",
        method: HttpMethod::Post,
        path: "/campaigns/{campaignId}/settings",
        required_fields: &[],
        one_of: None,
        build: update_settings,
    },
    OperationDescriptor {
        resource: "campaign",
        operation: "updateStatus",
        name: "Update Status",
        description: "Start, pause or stop a campaign",
        method: HttpMethod::Post,
        path: "/campaigns/{campaignId}/status",
        required_fields: &["status"],
        one_of: None,
        build: update_status,
    },
    // campaign statistics
    OperationDescriptor {
        resource: "campaignStatistics",
        operation: "get",
        name: "Get",
        description: "Get per-lead statistics of a campaign",
        method: HttpMethod::Get,
        path: "/campaigns/{campaignId}/statistics",
        required_fields: &[],
        one_of: None,
        build: campaign_statistics,
    },
    OperationDescriptor {
        resource: "campaignStatistics",
        operation: "getByDateRange",
        name: "Get By Date Range",
        description: "Get campaign analytics between two dates",
        method: HttpMethod::Get,
        path: "/campaigns/{campaignId}/analytics-by-date",
        required_fields: &["startDate", "endDate"],
        one_of: None,
        build: statistics_by_date_range,
    },
    OperationDescriptor {
        resource: "campaignStatistics",
        operation: "getTopLevel",
        name: "Get Top Level",
        description: "Get top level analytics of a campaign",
        method: HttpMethod::Get,
        path: "/campaigns/{campaignId}/analytics",
        required_fields: &[],
        one_of: None,
        build: no_body,
    },
    // client
    OperationDescriptor {
        resource: "client",
        operation: "create",
        name: "Create",
        description: "Create an agency client",
        method: HttpMethod::Post,
        path: "/client/save",
        required_fields: &["clientName", "clientEmail"],
        one_of: None,
        build: create_client,
    },
    OperationDescriptor {
        resource: "client",
        operation: "getAll",
        name: "Get Many",
        description: "List all clients",
        method: HttpMethod::Get,
        path: "/client/",
        required_fields: &[],
        one_of: None,
        build: no_body,
    },
    // email account
    OperationDescriptor {
        resource: "emailAccount",
        operation: "create",
        name: "Create",
        description: "Connect an SMTP/IMAP sending account",
        method: HttpMethod::Post,
        path: "/email-accounts/save",
        required_fields: &[],
        one_of: None,
        build: create_email_account,
    },
    OperationDescriptor {
        resource: "emailAccount",
        operation: "get",
        name: "Get",
        description: "Get an email account",
        method: HttpMethod::Get,
        path: "/email-accounts/{accountId}/",
        required_fields: &[],
        one_of: None,
        build: no_body,
    },
    OperationDescriptor {
        resource: "emailAccount",
        operation: "getAll",
        name: "Get Many",
        description: "List email accounts",
        method: HttpMethod::Get,
        path: "/email-accounts/",
        required_fields: &[],
        one_of: None,
        build: list_email_accounts,
    },
    OperationDescriptor {
        resource: "emailAccount",
        operation: "getWarmupStats",
        name: "Get Warmup Stats",
        description: "Get warmup statistics of the last seven days",
        method: HttpMethod::Get,
        path: "/email-accounts/{accountId}/warmup-stats",
        required_fields: &[],
        one_of: None,
        build: no_body,
    },
    OperationDescriptor {
        resource: "emailAccount",
        operation: "update",
        name: "Update",
        description: "Update an email account",
        method: HttpMethod::Post,
        path: "/email-accounts/{accountId}",
        required_fields: &[],
        one_of: None,
        build: update_email_account,
    },
    OperationDescriptor {
        resource: "emailAccount",
        operation: "updateWarmup",
        name: "Update Warmup",
        description: "Change the warmup settings of an email account",
        method: HttpMethod::Post,
        path: "/email-accounts/{accountId}/warmup",
        required_fields: &[],
        one_of: None,
        build: update_warmup,
    },
    // lead
    OperationDescriptor {
        resource: "lead",
        operation: "addToCampaign",
        name: "Add To Campaign",
        description: "Add up to 100 leads to a campaign",
        method: HttpMethod::Post,
        path: "/campaigns/{campaignId}/leads",
        required_fields: &["leadList"],
        one_of: None,
        build: add_leads_to_campaign,
    },
    OperationDescriptor {
        resource: "lead",
        operation: "addToGlobalBlockList",
        name: "Add To Global Block List",
        description: "Block domains or emails across all campaigns",
        method: HttpMethod::Post,
        path: "/leads/add-domain-block-list",
        required_fields: &["domainBlockList"],
        one_of: None,
        build: add_to_block_list,
    },
    OperationDescriptor {
        resource: "lead",
        operation: "deleteFromCampaign",
        name: "Delete From Campaign",
        description: "Remove a lead from a campaign",
        method: HttpMethod::Delete,
        path: "/campaigns/{campaignId}/leads/{leadId}",
        required_fields: &[],
        one_of: None,
        build: no_body,
    },
    OperationDescriptor {
        resource: "lead",
        operation: "getByEmail",
        name: "Get By Email",
        description: "Look up a lead by email address",
        method: HttpMethod::Get,
        path: "/leads/",
        required_fields: &["email"],
        one_of: None,
        build: lead_by_email,
    },
    OperationDescriptor {
        resource: "lead",
        operation: "getCampaigns",
        name: "Get Campaigns",
        description: "List the campaigns a lead belongs to",
        method: HttpMethod::Get,
        path: "/leads/{leadId}/campaigns",
        required_fields: &[],
        one_of: None,
        build: no_body,
    },
    OperationDescriptor {
        resource: "lead",
        operation: "getCategories",
        name: "Get Categories",
        description: "List lead categories",
        method: HttpMethod::Get,
        path: "/leads/fetch-categories",
        required_fields: &[],
        one_of: None,
        build: no_body,
    },
    OperationDescriptor {
        resource: "lead",
        operation: "listAllByCampaign",
        name: "List All By Campaign",
        description: "List the leads of a campaign",
        method: HttpMethod::Get,
        path: "/campaigns/{campaignId}/leads",
        required_fields: &[],
        one_of: None,
        build: list_campaign_leads,
    },
    OperationDescriptor {
        resource: "lead",
        operation: "pauseInCampaign",
        name: "Pause In Campaign",
        description: "Pause a lead in a campaign",
        method: HttpMethod::Post,
        path: "/campaigns/{campaignId}/leads/{leadId}/pause",
        required_fields: &[],
        one_of: None,
        build: no_body,
    },
    OperationDescriptor {
        resource: "lead",
        operation: "resumeInCampaign",
        name: "Resume In Campaign",
        description: "Resume a paused lead",
        method: HttpMethod::Post,
        path: "/campaigns/{campaignId}/leads/{leadId}/resume",
        required_fields: &[],
        one_of: None,
        build: resume_lead,
    },
    OperationDescriptor {
        resource: "lead",
        operation: "unsubscribeFromAll",
        name: "Unsubscribe From All Campaigns",
        description: "Unsubscribe a lead from every campaign",
        method: HttpMethod::Post,
        path: "/leads/{leadId}/unsubscribe",
        required_fields: &[],
        one_of: None,
        build: no_body,
    },
    OperationDescriptor {
        resource: "lead",
        operation: "unsubscribeFromCampaign",
        name: "Unsubscribe From Campaign",
        description: "Unsubscribe a lead from one campaign",
        method: HttpMethod::Post,
        path: "/campaigns/{campaignId}/leads/{leadId}/unsubscribe",
        required_fields: &[],
        one_of: None,
        build: no_body,
    },
    OperationDescriptor {
        resource: "lead",
        operation: "update",
        name: "Update",
        description: "Update a lead in a campaign",
        method: HttpMethod::Post,
        path: "/campaigns/{campaignId}/leads/{leadId}",
        required_fields: &[],
        one_of: None,
        build: update_lead,
    },
    OperationDescriptor {
        resource: "lead",
        operation: "updateCategory",
        name: "Update Category",
        description: "Change the category of a lead in a campaign",
        method: HttpMethod::Post,
        path: "/campaigns/{campaignId}/leads/{leadId}/category",
        required_fields: &["categoryId"],
        one_of: None,
        build: update_lead_category,
    },
    // master inbox
    OperationDescriptor {
        resource: "masterInbox",
        operation: "getMessageHistory",
        name: "Get Message History",
        description: "Get the message thread of a lead in a campaign",
        method: HttpMethod::Get,
        path: "/campaigns/{campaignId}/leads/{leadId}/message-history",
        required_fields: &[],
        one_of: None,
        build: no_body,
    },
    OperationDescriptor {
        resource: "masterInbox",
        operation: "replyToThread",
        name: "Reply To Thread",
        description: "Reply to a lead from the master inbox",
        method: HttpMethod::Post,
        path: "/campaigns/{campaignId}/reply-email-thread",
        required_fields: &[],
        one_of: None,
        build: reply_to_thread,
    },
    // webhook
    OperationDescriptor {
        resource: "webhook",
        operation: "delete",
        name: "Delete",
        description: "Delete a campaign webhook",
        method: HttpMethod::Delete,
        path: "/campaigns/{campaignId}/webhooks",
        required_fields: &["webhookId"],
        one_of: None,
        build: delete_webhook,
    },
    OperationDescriptor {
        resource: "webhook",
        operation: "getAll",
        name: "Get Many",
        description: "List the webhooks of a campaign",
        method: HttpMethod::Get,
        path: "/campaigns/{campaignId}/webhooks",
        required_fields: &[],
        one_of: None,
        build: no_body,
    },
    OperationDescriptor {
        resource: "webhook",
        operation: "upsert",
        name: "Upsert",
        description: "Create or update a campaign webhook",
        method: HttpMethod::Post,
        path: "/campaigns/{campaignId}/webhooks",
        required_fields: &[],
        one_of: None,
        build: upsert_webhook,
    },
];

static CATALOG: LazyLock<Catalog> = LazyLock::new(|| Catalog::new(RESOURCES, OPERATIONS));

/// Wire encoding of a collection entry
#[derive(Debug, Clone, Copy)]
enum Wire {
    Text,
    Integer,
    Flag,
    List,
    Json,
}

/// Copy non-empty collection entries into `body` under their wire names.
fn copy_collection(
    source: &Collection,
    mapping: &[(&str, &str, Wire)],
    body: &mut Payload,
) -> Result<(), OperationError> {
    for (field, wire_name, wire) in mapping {
        let value: Option<Value> = match wire {
            Wire::Text => source.string(field)?.map(Value::from),
            Wire::Integer => source.integer(field)?.map(Value::from),
            Wire::Flag => source.boolean(field)?.map(Value::from),
            Wire::List => source.string_list(field)?.map(Value::from),
            Wire::Json => source.json(field)?,
        };
        body.set_opt(wire_name, value);
    }
    Ok(())
}

fn positive_id(reader: &FieldReader<'_>, name: &str) -> Result<Option<i64>, OperationError> {
    Ok(reader.integer(name)?.filter(|id| *id > 0))
}

fn required_ids(reader: &FieldReader<'_>, name: &str) -> Result<Vec<i64>, OperationError> {
    reader
        .id_list(name)?
        .ok_or_else(|| OperationError::missing_parameter(name))
}

fn required_list(reader: &FieldReader<'_>, name: &str) -> Result<Vec<String>, OperationError> {
    reader
        .string_list(name)?
        .ok_or_else(|| OperationError::missing_parameter(name))
}

fn json_array(reader: &FieldReader<'_>, name: &str) -> Result<Vec<Value>, OperationError> {
    match reader.required_json(name)? {
        Value::Array(items) => Ok(items),
        _ => Err(OperationError::invalid_parameter(name, "must be a JSON array")),
    }
}

fn hour_of_day(reader: &FieldReader<'_>, name: &str) -> Result<String, OperationError> {
    let value = reader.required_string(name)?;
    NaiveTime::parse_from_str(&value, "%H:%M").map_err(|_| {
        OperationError::invalid_parameter(name, format!("'{}' is not a HH:MM time", value))
    })?;
    Ok(value)
}

fn calendar_date(reader: &FieldReader<'_>, name: &str) -> Result<NaiveDate, OperationError> {
    let value = reader.required_string(name)?;
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        OperationError::invalid_parameter(name, format!("'{}' is not a YYYY-MM-DD date", value))
    })
}

fn no_body(_reader: &FieldReader<'_>) -> Result<RequestParts, OperationError> {
    Ok(RequestParts::empty())
}

fn email_account_ids(reader: &FieldReader<'_>) -> Result<RequestParts, OperationError> {
    let mut body = Payload::new();
    body.set("email_account_ids", required_ids(reader, "emailAccountIds")?);
    Ok(RequestParts::with_body(body.into_value()))
}

fn create_campaign(reader: &FieldReader<'_>) -> Result<RequestParts, OperationError> {
    let mut body = Payload::new();
    body.set("name", reader.required_string("campaignName")?)
        .set_opt("client_id", positive_id(reader, "clientId")?);
    Ok(RequestParts::with_body(body.into_value()))
}

fn save_sequence(reader: &FieldReader<'_>) -> Result<RequestParts, OperationError> {
    let mut body = Payload::new();
    body.set("sequences", json_array(reader, "sequences")?);
    Ok(RequestParts::with_body(body.into_value()))
}

fn update_schedule(reader: &FieldReader<'_>) -> Result<RequestParts, OperationError> {
    let body = json_or_fields(reader, |reader| {
        let days = required_ids(reader, "daysOfTheWeek")?;
        if let Some(day) = days.iter().find(|d| !(0..=6).contains(*d)) {
            return Err(OperationError::invalid_parameter(
                "daysOfTheWeek",
                format!("{} is not a day number between 0 and 6", day),
            ));
        }
        let schedule_start = reader.string("scheduleStartTime")?;
        if let Some(start) = &schedule_start {
            DateTime::parse_from_rfc3339(start).map_err(|_| {
                OperationError::invalid_parameter(
                    "scheduleStartTime",
                    format!("'{}' is not an RFC 3339 timestamp", start),
                )
            })?;
        }

        let mut body = Payload::new();
        body.set("timezone", reader.required_string("timezone")?)
            .set("days_of_the_week", days)
            .set("start_hour", hour_of_day(reader, "startHour")?)
            .set("end_hour", hour_of_day(reader, "endHour")?)
            .set(
                "min_time_btw_emails",
                reader.required_integer("minTimeBetweenEmails")?,
            )
            .set(
                "max_new_leads_per_day",
                reader.required_integer("maxNewLeadsPerDay")?,
            )
            .set_opt("schedule_start_time", schedule_start);
        Ok(body.into_value())
    })?;
    Ok(RequestParts::with_body(body))
}

fn update_settings(reader: &FieldReader<'_>) -> Result<RequestParts, OperationError> {
    let body = json_or_fields(reader, |reader| {
        let mut body = Payload::new();
        copy_collection(
            &reader.collection("settings")?,
            &[
                ("trackSettings", "track_settings", Wire::List),
                ("stopLeadSettings", "stop_lead_settings", Wire::Text),
                ("unsubscribeText", "unsubscribe_text", Wire::Text),
                ("sendAsPlainText", "send_as_plain_text", Wire::Flag),
                ("followUpPercentage", "follow_up_percentage", Wire::Integer),
                ("clientId", "client_id", Wire::Integer),
                ("enableAiEspMatching", "enable_ai_esp_matching", Wire::Flag),
            ],
            &mut body,
        )?;
        if body.is_empty() {
            return Err(OperationError::validation(
                "At least one setting must be provided",
            ));
        }
        Ok(body.into_value())
    })?;
    Ok(RequestParts::with_body(body))
}

fn update_status(reader: &FieldReader<'_>) -> Result<RequestParts, OperationError> {
    let status = reader.required_string("status")?;
    if !CAMPAIGN_STATUSES.iter().any(|s| s.value == status) {
        return Err(OperationError::invalid_parameter(
            "status",
            format!("'{}' must be one of PAUSED, STOPPED, START", status),
        ));
    }
    let mut body = Payload::new();
    body.set("status", status);
    Ok(RequestParts::with_body(body.into_value()))
}

fn campaign_statistics(reader: &FieldReader<'_>) -> Result<RequestParts, OperationError> {
    let filters = reader.collection("statisticsFilters")?;
    Ok(RequestParts::empty()
        .query_opt("offset", filters.integer("offset")?)
        .query_opt("limit", filters.integer("limit")?)
        .query_opt(
            "email_sequence_number",
            filters.integer("emailSequenceNumber")?,
        )
        .query_opt("email_status", filters.string("emailStatus")?))
}

fn statistics_by_date_range(reader: &FieldReader<'_>) -> Result<RequestParts, OperationError> {
    let start = calendar_date(reader, "startDate")?;
    let end = calendar_date(reader, "endDate")?;
    if start > end {
        return Err(OperationError::validation(
            "Start date must not be after end date",
        ));
    }
    Ok(RequestParts::empty()
        .query("start_date", start.format("%Y-%m-%d"))
        .query("end_date", end.format("%Y-%m-%d")))
}

fn create_client(reader: &FieldReader<'_>) -> Result<RequestParts, OperationError> {
    let mut body = Payload::new();
    body.set("name", reader.required_string("clientName")?)
        .set("email", reader.required_string("clientEmail")?)
        .set("permission", reader.string_list("permission")?.unwrap_or_default())
        .set_opt("logo", reader.string("logo")?)
        .set_opt("logo_url", reader.string("logoUrl")?)
        .set_opt("password", reader.string("clientPassword")?);
    Ok(RequestParts::with_body(body.into_value()))
}

fn create_email_account(reader: &FieldReader<'_>) -> Result<RequestParts, OperationError> {
    let body = json_or_fields(reader, |reader| {
        let mut body = Payload::new();
        body.set("from_name", reader.required_string("fromName")?)
            .set("from_email", reader.required_string("fromEmail")?)
            .set("user_name", reader.required_string("userName")?)
            .set("password", reader.required_string("password")?)
            .set("smtp_host", reader.required_string("smtpHost")?)
            .set("smtp_port", reader.required_integer("smtpPort")?)
            .set("imap_host", reader.required_string("imapHost")?)
            .set("imap_port", reader.required_integer("imapPort")?);
        copy_collection(
            &reader.collection("accountOptions")?,
            &[
                ("maxEmailPerDay", "max_email_per_day", Wire::Integer),
                ("customTrackingUrl", "custom_tracking_url", Wire::Text),
                ("bcc", "bcc", Wire::Text),
                ("signature", "signature", Wire::Text),
                ("warmupEnabled", "warmup_enabled", Wire::Flag),
                ("totalWarmupPerDay", "total_warmup_per_day", Wire::Integer),
                ("dailyRampup", "daily_rampup", Wire::Integer),
                ("replyRatePercentage", "reply_rate_percentage", Wire::Integer),
                ("clientId", "client_id", Wire::Integer),
            ],
            &mut body,
        )?;
        Ok(body.into_value())
    })?;
    Ok(RequestParts::with_body(body))
}

fn list_email_accounts(reader: &FieldReader<'_>) -> Result<RequestParts, OperationError> {
    page(reader, "emailAccountOffset", "emailAccountLimit")
}

fn update_email_account(reader: &FieldReader<'_>) -> Result<RequestParts, OperationError> {
    let body = json_or_fields(reader, |reader| {
        let mut body = Payload::new();
        copy_collection(
            &reader.collection("accountUpdateFields")?,
            &[
                ("maxEmailPerDay", "max_email_per_day", Wire::Integer),
                ("customTrackingUrl", "custom_tracking_url", Wire::Text),
                ("bcc", "bcc", Wire::Text),
                ("signature", "signature", Wire::Text),
                ("clientId", "client_id", Wire::Integer),
                ("timeToWaitInMins", "time_to_wait_in_mins", Wire::Integer),
            ],
            &mut body,
        )?;
        if body.is_empty() {
            return Err(OperationError::validation(
                "At least one field to update must be provided",
            ));
        }
        Ok(body.into_value())
    })?;
    Ok(RequestParts::with_body(body))
}

fn update_warmup(reader: &FieldReader<'_>) -> Result<RequestParts, OperationError> {
    let body = json_or_fields(reader, |reader| {
        let mut body = Payload::new();
        body.set(
            "warmup_enabled",
            reader.boolean("warmupEnabled")?.unwrap_or(true),
        );
        copy_collection(
            &reader.collection("warmupOptions")?,
            &[
                ("totalWarmupPerDay", "total_warmup_per_day", Wire::Integer),
                ("dailyRampup", "daily_rampup", Wire::Integer),
                ("replyRatePercentage", "reply_rate_percentage", Wire::Integer),
                ("warmupKeyId", "warmup_key_id", Wire::Text),
            ],
            &mut body,
        )?;
        Ok(body.into_value())
    })?;
    Ok(RequestParts::with_body(body))
}

fn add_leads_to_campaign(reader: &FieldReader<'_>) -> Result<RequestParts, OperationError> {
    let leads = json_array(reader, "leadList")?;
    if leads.is_empty() {
        return Err(OperationError::invalid_parameter(
            "leadList",
            "must contain at least one lead",
        ));
    }
    if leads.len() > MAX_LEADS_PER_REQUEST {
        return Err(OperationError::invalid_parameter(
            "leadList",
            format!(
                "contains {} leads, at most {} are accepted per request",
                leads.len(),
                MAX_LEADS_PER_REQUEST
            ),
        ));
    }
    if leads.iter().any(|lead| !lead.is_object()) {
        return Err(OperationError::invalid_parameter(
            "leadList",
            "every lead must be a JSON object",
        ));
    }

    let mut settings = Payload::new();
    copy_collection(
        &reader.collection("leadSettings")?,
        &[
            (
                "ignoreGlobalBlockList",
                "ignore_global_block_list",
                Wire::Flag,
            ),
            (
                "ignoreUnsubscribeList",
                "ignore_unsubscribe_list",
                Wire::Flag,
            ),
            (
                "ignoreDuplicateLeadsInOtherCampaign",
                "ignore_duplicate_leads_in_other_campaign",
                Wire::Flag,
            ),
        ],
        &mut settings,
    )?;

    let mut body = Payload::new();
    body.set("lead_list", leads)
        .set_opt(
            "settings",
            (!settings.is_empty()).then(|| settings.into_value()),
        );
    Ok(RequestParts::with_body(body.into_value()))
}

fn add_to_block_list(reader: &FieldReader<'_>) -> Result<RequestParts, OperationError> {
    let mut body = Payload::new();
    body.set("domain_block_list", required_list(reader, "domainBlockList")?)
        .set_opt("client_id", positive_id(reader, "clientId")?);
    Ok(RequestParts::with_body(body.into_value()))
}

fn lead_by_email(reader: &FieldReader<'_>) -> Result<RequestParts, OperationError> {
    Ok(RequestParts::empty().query("email", reader.required_string("email")?))
}

fn page(
    reader: &FieldReader<'_>,
    offset_field: &str,
    limit_field: &str,
) -> Result<RequestParts, OperationError> {
    let limit = reader.required_integer(limit_field)?;
    if limit < 1 {
        return Err(OperationError::invalid_parameter(
            limit_field,
            "must be at least 1",
        ));
    }
    let offset = reader.required_integer(offset_field)?;
    if offset < 0 {
        return Err(OperationError::invalid_parameter(
            offset_field,
            "must not be negative",
        ));
    }
    Ok(RequestParts::empty()
        .query("offset", offset)
        .query("limit", limit))
}

fn list_campaign_leads(reader: &FieldReader<'_>) -> Result<RequestParts, OperationError> {
    page(reader, "leadOffset", "leadLimit")
}

fn resume_lead(reader: &FieldReader<'_>) -> Result<RequestParts, OperationError> {
    let mut body = Payload::new();
    body.set_opt(
        "resume_lead_with_delay_days",
        positive_id(reader, "resumeDelayDays")?,
    );
    Ok(RequestParts::with_body(body.into_value()))
}

fn update_lead(reader: &FieldReader<'_>) -> Result<RequestParts, OperationError> {
    let body = json_or_fields(reader, |reader| {
        let mut body = Payload::new();
        copy_collection(
            &reader.collection("leadFields")?,
            &[
                ("email", "email", Wire::Text),
                ("firstName", "first_name", Wire::Text),
                ("lastName", "last_name", Wire::Text),
                ("phoneNumber", "phone_number", Wire::Text),
                ("companyName", "company_name", Wire::Text),
                ("website", "website", Wire::Text),
                ("location", "location", Wire::Text),
                ("linkedinProfile", "linkedin_profile", Wire::Text),
                ("companyUrl", "company_url", Wire::Text),
                ("customFields", "custom_fields", Wire::Json),
            ],
            &mut body,
        )?;
        if body.is_empty() {
            return Err(OperationError::validation(
                "At least one field to update must be provided",
            ));
        }
        Ok(body.into_value())
    })?;
    Ok(RequestParts::with_body(body))
}

fn update_lead_category(reader: &FieldReader<'_>) -> Result<RequestParts, OperationError> {
    let mut body = Payload::new();
    body.set("category_id", reader.required_integer("categoryId")?)
        .set("pause_lead", reader.boolean("pauseLead")?.unwrap_or(false));
    Ok(RequestParts::with_body(body.into_value()))
}

fn reply_to_thread(reader: &FieldReader<'_>) -> Result<RequestParts, OperationError> {
    let body = json_or_fields(reader, |reader| {
        let mut body = Payload::new();
        body.set("email_stats_id", reader.required_string("emailStatsId")?)
            .set("email_body", reader.required_string("emailBody")?);
        copy_collection(
            &reader.collection("replyOptions")?,
            &[
                ("replyMessageId", "reply_message_id", Wire::Text),
                ("replyEmailTime", "reply_email_time", Wire::Text),
                ("replyEmailBody", "reply_email_body", Wire::Text),
                ("cc", "cc", Wire::Text),
                ("bcc", "bcc", Wire::Text),
                ("addSignature", "add_signature", Wire::Flag),
                ("toFirstName", "to_first_name", Wire::Text),
                ("toLastName", "to_last_name", Wire::Text),
                ("toEmail", "to_email", Wire::Text),
            ],
            &mut body,
        )?;
        Ok(body.into_value())
    })?;
    Ok(RequestParts::with_body(body))
}

fn upsert_webhook(reader: &FieldReader<'_>) -> Result<RequestParts, OperationError> {
    let body = json_or_fields(reader, |reader| {
        let mut body = Payload::new();
        body.set_opt("id", positive_id(reader, "webhookId")?)
            .set("name", reader.required_string("webhookName")?)
            .set("webhook_url", reader.required_string("webhookUrl")?)
            .set("event_types", required_list(reader, "eventTypes")?)
            .set_opt("categories", reader.string_list("categories")?);
        Ok(body.into_value())
    })?;
    Ok(RequestParts::with_body(body))
}

fn delete_webhook(reader: &FieldReader<'_>) -> Result<RequestParts, OperationError> {
    let mut body = Payload::new();
    body.set("id", reader.required_integer("webhookId")?);
    Ok(RequestParts::with_body(body.into_value()))
}

/// Smartlead campaign platform connector
#[derive(Debug, Clone)]
pub struct SmartleadConnector {
    base_url: Url,
}

impl SmartleadConnector {
    pub fn new(base_url: Url) -> Self {
        Self { base_url }
    }
}

impl Connector for SmartleadConnector {
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
}

/// Register the Smartlead connector with the registry
pub fn register_smartlead_connector(registry: &mut Registry, connector: Arc<SmartleadConnector>) {
    registry.register(connector);
}
