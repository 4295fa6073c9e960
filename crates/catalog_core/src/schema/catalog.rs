//! Composition schema of the registry catalog, built once per process.

use super::{CompositionSchema, SchemaError};
use crate::model::kind::EntityKind;
use once_cell::sync::OnceCell;

static CATALOG_SCHEMA: OnceCell<CompositionSchema> = OnceCell::new();

/// Returns the validated catalog schema, building it on first use.
///
/// # Errors
/// - Returns the `SchemaError` of a defective declaration. The declaration is
///   static, so this only fires on a wiring bug.
pub fn catalog_schema() -> Result<&'static CompositionSchema, SchemaError> {
    CATALOG_SCHEMA.get_or_try_init(build_catalog_schema)
}

fn build_catalog_schema() -> Result<CompositionSchema, SchemaError> {
    use EntityKind::*;

    CompositionSchema::builder()
        .root(Organization)
        .categories(
            Organization,
            &[
                OrganizationName,
                OrganizationDescription,
                Email,
                PhoneNumber,
                WebPage,
                Address,
            ],
        )
        .categories(Address, &[StreetAddress, PostOfficeBoxAddress])
        .categories(
            StreetAddress,
            &[
                Street,
                StreetAddressPostOffice,
                StreetAddressMunicipality,
                StreetAddressAdditionalInformation,
            ],
        )
        .category(StreetAddressMunicipality, StreetAddressMunicipalityName)
        .categories(
            PostOfficeBoxAddress,
            &[
                PostOfficeBox,
                PostOfficeBoxAddressPostOffice,
                PostOfficeBoxAddressMunicipality,
                PostOfficeBoxAddressAdditionalInformation,
            ],
        )
        .category(
            PostOfficeBoxAddressMunicipality,
            PostOfficeBoxAddressMunicipalityName,
        )
        .root(Company)
        .categories(
            Company,
            &[
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
            ],
        )
        .root(Member)
        .category(Member, Subsystem)
        .category(Subsystem, Service)
        .categories(Service, &[Wsdl, OpenApi])
        .build()
}
