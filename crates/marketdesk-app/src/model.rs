// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::OffsetDateTime;

use crate::ids::*;

/// Enums carried on the wire as lowercase strings, where an empty string
/// means "not chosen yet".
pub trait WireEnum: Sized + Copy {
    fn as_str(self) -> &'static str;
    fn parse(value: &str) -> Option<Self>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartyStatus {
    Active,
    Inactive,
    Pending,
}

impl PartyStatus {
    pub const ALL: [Self; 3] = [Self::Active, Self::Inactive, Self::Pending];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
            Self::Pending => "Pending",
        }
    }
}

impl WireEnum for PartyStatus {
    fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Pending => "pending",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(Self::Active),
            "inactive" => Some(Self::Inactive),
            "pending" => Some(Self::Pending),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldCategory {
    Buyer,
    Seller,
}

impl FieldCategory {
    pub const ALL: [Self; 2] = [Self::Buyer, Self::Seller];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Buyer => "Buyer",
            Self::Seller => "Seller",
        }
    }
}

impl WireEnum for FieldCategory {
    fn as_str(self) -> &'static str {
        match self {
            Self::Buyer => "buyer",
            Self::Seller => "seller",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "buyer" => Some(Self::Buyer),
            "seller" => Some(Self::Seller),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Input,
    Textarea,
    Upload,
}

impl FieldType {
    pub const ALL: [Self; 3] = [Self::Input, Self::Textarea, Self::Upload];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Input => "Input",
            Self::Textarea => "Textarea",
            Self::Upload => "Upload",
        }
    }
}

impl WireEnum for FieldType {
    fn as_str(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Textarea => "textarea",
            Self::Upload => "upload",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "input" => Some(Self::Input),
            "textarea" => Some(Self::Textarea),
            "upload" => Some(Self::Upload),
            _ => None,
        }
    }
}

/// Unknown values decode as unset so one odd record cannot fail a whole list.
/// The decode is lossy: re-encoding such a record writes the blank value.
fn deserialize_wire_enum<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: WireEnum,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .and_then(|value| T::parse(&value.to_ascii_lowercase())))
}

fn serialize_wire_enum<S, T>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: WireEnum,
{
    serializer.serialize_str(value.map(WireEnum::as_str).unwrap_or(""))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartyKind {
    Buyer,
    Seller,
}

impl PartyKind {
    /// Prefix of every record key on the wire (`buyer_name`, `seller_phone`).
    pub const fn wire_prefix(self) -> &'static str {
        match self {
            Self::Buyer => "buyer",
            Self::Seller => "seller",
        }
    }

    pub const fn noun(self) -> &'static str {
        match self {
            Self::Buyer => "Buyer",
            Self::Seller => "Seller",
        }
    }

    pub const fn plural(self) -> &'static str {
        match self {
            Self::Buyer => "buyers",
            Self::Seller => "sellers",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TabKind {
    Buyers,
    Sellers,
    Fields,
}

impl TabKind {
    pub const ALL: [Self; 3] = [Self::Buyers, Self::Sellers, Self::Fields];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Buyers => "buyers",
            Self::Sellers => "sellers",
            Self::Fields => "fields",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "buyers" => Some(Self::Buyers),
            "sellers" => Some(Self::Sellers),
            "fields" => Some(Self::Fields),
            _ => None,
        }
    }

    pub const fn party_kind(self) -> Option<PartyKind> {
        match self {
            Self::Buyers => Some(PartyKind::Buyer),
            Self::Sellers => Some(PartyKind::Seller),
            Self::Fields => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// Shared shape of buyer and seller records; only the key prefix differs.
pub trait PartyRecord: Clone {
    type Id: Clone + Eq + std::fmt::Display;

    const KIND: PartyKind;

    fn id(&self) -> &Self::Id;
    fn name(&self) -> &str;
    fn email(&self) -> &str;
    fn phone(&self) -> &str;
    fn status(&self) -> Option<PartyStatus>;
    fn about(&self) -> &str;
}

macro_rules! party_record {
    (
        $record:ident,
        $id:ident,
        $kind:expr,
        name = $name_key:tt,
        email = $email_key:tt,
        phone = $phone_key:tt,
        status = $status_key:tt,
        about = $about_key:tt $(,)?
    ) => {
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        pub struct $record {
            #[serde(rename = "_id")]
            pub id: $id,
            #[serde(rename = $name_key, default)]
            pub name: String,
            #[serde(rename = $email_key, default)]
            pub email: String,
            #[serde(rename = $phone_key, default)]
            pub phone: String,
            #[serde(
                rename = $status_key,
                default,
                deserialize_with = "deserialize_wire_enum",
                serialize_with = "serialize_wire_enum"
            )]
            pub status: Option<PartyStatus>,
            #[serde(rename = $about_key, default)]
            pub about: String,
            #[serde(rename = "createdAt", with = "time::serde::rfc3339")]
            pub created_at: OffsetDateTime,
            #[serde(rename = "updatedAt", with = "time::serde::rfc3339")]
            pub updated_at: OffsetDateTime,
        }

        impl PartyRecord for $record {
            type Id = $id;

            const KIND: PartyKind = $kind;

            fn id(&self) -> &Self::Id {
                &self.id
            }

            fn name(&self) -> &str {
                &self.name
            }

            fn email(&self) -> &str {
                &self.email
            }

            fn phone(&self) -> &str {
                &self.phone
            }

            fn status(&self) -> Option<PartyStatus> {
                self.status
            }

            fn about(&self) -> &str {
                &self.about
            }
        }
    };
}

party_record!(
    Buyer,
    BuyerId,
    PartyKind::Buyer,
    name = "buyer_name",
    email = "buyer_email",
    phone = "buyer_phone",
    status = "buyer_status",
    about = "buyer_about",
);

party_record!(
    Seller,
    SellerId,
    PartyKind::Seller,
    name = "seller_name",
    email = "seller_email",
    phone = "seller_phone",
    status = "seller_status",
    about = "seller_about",
);

/// Metadata describing a custom attribute. Not enforced against parties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    #[serde(rename = "_id")]
    pub id: FieldId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(
        default,
        deserialize_with = "deserialize_wire_enum",
        serialize_with = "serialize_wire_enum"
    )]
    pub category: Option<FieldCategory>,
    #[serde(
        rename = "type",
        default,
        deserialize_with = "deserialize_wire_enum",
        serialize_with = "serialize_wire_enum"
    )]
    pub field_type: Option<FieldType>,
    #[serde(rename = "createdAt", with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(rename = "updatedAt", with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    #[serde(rename = "__v", default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<i64>,
}

/// Body of a party add/update request, before the wire prefix is applied.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PartyDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub status: Option<PartyStatus>,
    pub about: String,
}

impl PartyDraft {
    pub fn from_record<R: PartyRecord>(record: &R) -> Self {
        Self {
            name: record.name().to_owned(),
            email: record.email().to_owned(),
            phone: record.phone().to_owned(),
            status: record.status(),
            about: record.about().to_owned(),
        }
    }

    pub fn to_wire(&self, kind: PartyKind) -> serde_json::Value {
        let prefix = kind.wire_prefix();
        let mut body = serde_json::Map::new();
        body.insert(format!("{prefix}_name"), self.name.clone().into());
        body.insert(format!("{prefix}_email"), self.email.clone().into());
        body.insert(format!("{prefix}_phone"), self.phone.clone().into());
        body.insert(
            format!("{prefix}_status"),
            self.status.map(WireEnum::as_str).unwrap_or("").into(),
        );
        body.insert(format!("{prefix}_about"), self.about.clone().into());
        serde_json::Value::Object(body)
    }
}

/// Body of `add-field`: a field record minus its server-assigned parts.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FieldDraft {
    pub title: String,
    pub description: String,
    #[serde(serialize_with = "serialize_wire_enum")]
    pub category: Option<FieldCategory>,
    #[serde(rename = "type", serialize_with = "serialize_wire_enum")]
    pub field_type: Option<FieldType>,
}

impl FieldDraft {
    pub fn from_record(field: &Field) -> Self {
        Self {
            title: field.title.clone(),
            description: field.description.clone(),
            category: field.category,
            field_type: field.field_type,
        }
    }

    /// The full replacement record sent by `update-field`.
    pub fn apply_to(&self, field: &Field) -> Field {
        Field {
            title: self.title.clone(),
            description: self.description.clone(),
            category: self.category,
            field_type: self.field_type,
            ..field.clone()
        }
    }
}
