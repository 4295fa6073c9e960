//! Closed set of record kinds stored in the catalog.
//!
//! The canonical name of a kind doubles as its change category name and as
//! the `records.kind` column value, so names must stay stable.

use serde::{Deserialize, Serialize};

/// Every record type the catalog stores, roots and nested sub-records alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    // Organization tree.
    Organization,
    OrganizationName,
    OrganizationDescription,
    Email,
    PhoneNumber,
    WebPage,
    Address,
    StreetAddress,
    Street,
    StreetAddressPostOffice,
    StreetAddressMunicipality,
    StreetAddressMunicipalityName,
    StreetAddressAdditionalInformation,
    PostOfficeBoxAddress,
    PostOfficeBox,
    PostOfficeBoxAddressPostOffice,
    PostOfficeBoxAddressMunicipality,
    PostOfficeBoxAddressMunicipalityName,
    PostOfficeBoxAddressAdditionalInformation,
    // Company tree.
    Company,
    BusinessAddress,
    BusinessAuxiliaryName,
    BusinessIdChange,
    BusinessLine,
    BusinessName,
    CompanyForm,
    ContactDetail,
    Language,
    Liquidation,
    RegisteredEntry,
    RegisteredOffice,
    // Member tree.
    Member,
    Subsystem,
    Service,
    Wsdl,
    OpenApi,
}

const ALL_KINDS: &[EntityKind] = &[
    EntityKind::Organization,
    EntityKind::OrganizationName,
    EntityKind::OrganizationDescription,
    EntityKind::Email,
    EntityKind::PhoneNumber,
    EntityKind::WebPage,
    EntityKind::Address,
    EntityKind::StreetAddress,
    EntityKind::Street,
    EntityKind::StreetAddressPostOffice,
    EntityKind::StreetAddressMunicipality,
    EntityKind::StreetAddressMunicipalityName,
    EntityKind::StreetAddressAdditionalInformation,
    EntityKind::PostOfficeBoxAddress,
    EntityKind::PostOfficeBox,
    EntityKind::PostOfficeBoxAddressPostOffice,
    EntityKind::PostOfficeBoxAddressMunicipality,
    EntityKind::PostOfficeBoxAddressMunicipalityName,
    EntityKind::PostOfficeBoxAddressAdditionalInformation,
    EntityKind::Company,
    EntityKind::BusinessAddress,
    EntityKind::BusinessAuxiliaryName,
    EntityKind::BusinessIdChange,
    EntityKind::BusinessLine,
    EntityKind::BusinessName,
    EntityKind::CompanyForm,
    EntityKind::ContactDetail,
    EntityKind::Language,
    EntityKind::Liquidation,
    EntityKind::RegisteredEntry,
    EntityKind::RegisteredOffice,
    EntityKind::Member,
    EntityKind::Subsystem,
    EntityKind::Service,
    EntityKind::Wsdl,
    EntityKind::OpenApi,
];

impl EntityKind {
    /// All kinds in declaration order.
    pub fn all() -> &'static [EntityKind] {
        ALL_KINDS
    }

    /// Canonical type name, also used as the change category name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Organization => "Organization",
            Self::OrganizationName => "OrganizationName",
            Self::OrganizationDescription => "OrganizationDescription",
            Self::Email => "Email",
            Self::PhoneNumber => "PhoneNumber",
            Self::WebPage => "WebPage",
            Self::Address => "Address",
            Self::StreetAddress => "StreetAddress",
            Self::Street => "Street",
            Self::StreetAddressPostOffice => "StreetAddressPostOffice",
            Self::StreetAddressMunicipality => "StreetAddressMunicipality",
            Self::StreetAddressMunicipalityName => "StreetAddressMunicipalityName",
            Self::StreetAddressAdditionalInformation => "StreetAddressAdditionalInformation",
            Self::PostOfficeBoxAddress => "PostOfficeBoxAddress",
            Self::PostOfficeBox => "PostOfficeBox",
            Self::PostOfficeBoxAddressPostOffice => "PostOfficeBoxAddressPostOffice",
            Self::PostOfficeBoxAddressMunicipality => "PostOfficeBoxAddressMunicipality",
            Self::PostOfficeBoxAddressMunicipalityName => "PostOfficeBoxAddressMunicipalityName",
            Self::PostOfficeBoxAddressAdditionalInformation => {
                "PostOfficeBoxAddressAdditionalInformation"
            }
            Self::Company => "Company",
            Self::BusinessAddress => "BusinessAddress",
            Self::BusinessAuxiliaryName => "BusinessAuxiliaryName",
            Self::BusinessIdChange => "BusinessIdChange",
            Self::BusinessLine => "BusinessLine",
            Self::BusinessName => "BusinessName",
            Self::CompanyForm => "CompanyForm",
            Self::ContactDetail => "ContactDetail",
            Self::Language => "Language",
            Self::Liquidation => "Liquidation",
            Self::RegisteredEntry => "RegisteredEntry",
            Self::RegisteredOffice => "RegisteredOffice",
            Self::Member => "Member",
            Self::Subsystem => "Subsystem",
            Self::Service => "Service",
            Self::Wsdl => "Wsdl",
            Self::OpenApi => "OpenApi",
        }
    }

    /// Parses a canonical type name back into a kind.
    pub fn parse(value: &str) -> Option<Self> {
        ALL_KINDS.iter().copied().find(|kind| kind.as_str() == value)
    }

    /// Whether records of this kind are addressable by a business key.
    pub fn is_root(self) -> bool {
        matches!(self, Self::Organization | Self::Company | Self::Member)
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
