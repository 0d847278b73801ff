//! TypeScript declarations for browser clients
//!
//! The tables below describe every record and message shape on the wire.
//! [`render`] turns them into a `ServerTypes` namespace that front-ends can
//! import. Tests keep the tables in step with the serde types.

use std::fmt::Write;

/// TypeScript type of a single field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TsType {
    String,
    Boolean,
    /// Opaque relay payload
    Unknown,
    StringArray,
    /// Reference to another declared interface
    Ref(&'static str),
    /// `{[key: string]: T}` keyed by id
    Map(&'static str),
}

impl TsType {
    fn render(self) -> String {
        match self {
            TsType::String => "string".to_string(),
            TsType::Boolean => "boolean".to_string(),
            TsType::Unknown => "unknown".to_string(),
            TsType::StringArray => "string[]".to_string(),
            TsType::Ref(name) => name.to_string(),
            TsType::Map(name) => format!("{{[key: string]: {name}}}"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TsField {
    pub name: &'static str,
    pub ty: TsType,
    pub optional: bool,
}

const fn field(name: &'static str, ty: TsType) -> TsField {
    TsField {
        name,
        ty,
        optional: false,
    }
}

const fn optional(name: &'static str, ty: TsType) -> TsField {
    TsField {
        name,
        ty,
        optional: true,
    }
}

/// One exported interface
#[derive(Debug, Clone, Copy)]
pub struct TsInterface {
    pub name: &'static str,
    /// Literal value of the `type` field, for message interfaces
    pub discriminator: Option<&'static str>,
    pub fields: &'static [TsField],
}

/// Plain records referenced by messages
pub const RECORDS: &[TsInterface] = &[
    TsInterface {
        name: "Client",
        discriminator: None,
        fields: &[
            field("id", TsType::String),
            field("name", TsType::String),
            field("lastJoinTime", TsType::String),
            optional("activeSessionId", TsType::String),
        ],
    },
    TsInterface {
        name: "Session",
        discriminator: None,
        fields: &[
            field("id", TsType::String),
            field("ownerId", TsType::String),
            field("clientIds", TsType::StringArray),
            field("createdAt", TsType::String),
        ],
    },
];

const MEMBERSHIP_FIELDS: &[TsField] = &[
    field("clientId", TsType::String),
    field("sessionId", TsType::String),
    field("sessionOwnerId", TsType::String),
    field("clientMap", TsType::Map("Client")),
];

/// Every message in both directions
pub const MESSAGES: &[TsInterface] = &[
    TsInterface {
        name: "ClientConnectMsg",
        discriminator: Some("ClientConnect"),
        fields: &[field("client", TsType::Ref("Client"))],
    },
    TsInterface {
        name: "ClientUpdatedMsg",
        discriminator: Some("ClientUpdated"),
        fields: &[field("client", TsType::Ref("Client"))],
    },
    TsInterface {
        name: "UpdateClientMsg",
        discriminator: Some("UpdateClient"),
        fields: &[field("name", TsType::String)],
    },
    TsInterface {
        name: "CreateSessionMsg",
        discriminator: Some("CreateSession"),
        fields: &[optional("addClientId", TsType::String)],
    },
    TsInterface {
        name: "AddClientToSessionMsg",
        discriminator: Some("AddClientToSession"),
        fields: &[
            field("sessionId", TsType::String),
            field("addClientId", TsType::String),
        ],
    },
    TsInterface {
        name: "ClientJoinedSessionMsg",
        discriminator: Some("ClientJoinedSession"),
        fields: MEMBERSHIP_FIELDS,
    },
    TsInterface {
        name: "ClientLeftSessionMsg",
        discriminator: Some("ClientLeftSession"),
        fields: MEMBERSHIP_FIELDS,
    },
    TsInterface {
        name: "BroadcastToSessionMsg",
        discriminator: Some("BroadcastToSession"),
        fields: &[field("payload", TsType::Unknown)],
    },
    TsInterface {
        name: "BroadcastFromSessionMsg",
        discriminator: Some("BroadcastFromSession"),
        fields: &[
            field("fromSessionOwner", TsType::Boolean),
            field("senderId", TsType::String),
            field("payload", TsType::Unknown),
        ],
    },
    TsInterface {
        name: "ErrorMsg",
        discriminator: Some("error"),
        fields: &[field("message", TsType::String)],
    },
    TsInterface {
        name: "InfoMsg",
        discriminator: Some("info"),
        fields: &[field("message", TsType::String)],
    },
];

const INDENT: &str = "    ";

/// Render the `ServerTypes` namespace
pub fn render() -> String {
    let mut out = String::from("export namespace ServerTypes {\n");

    let union: Vec<&str> = MESSAGES.iter().map(|msg| msg.name).collect();
    let _ = writeln!(out, "{INDENT}export type Msg = {};", union.join(" | "));

    for interface in RECORDS.iter().chain(MESSAGES) {
        out.push('\n');
        render_interface(&mut out, interface);
    }

    out.push_str("}\n");
    out
}

fn render_interface(out: &mut String, interface: &TsInterface) {
    let _ = writeln!(out, "{INDENT}export interface {} {{", interface.name);
    if let Some(tag) = interface.discriminator {
        let _ = writeln!(out, "{INDENT}{INDENT}type: \"{tag}\";");
    }
    for field in interface.fields {
        let marker = if field.optional { "?" } else { "" };
        let _ = writeln!(
            out,
            "{INDENT}{INDENT}{}{marker}: {};",
            field.name,
            field.ty.render()
        );
    }
    let _ = writeln!(out, "{INDENT}}}");
}
