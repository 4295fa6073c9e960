//! Shared catalog fixtures for integration tests.
//!
//! Each fixture is a record tree that can be built as an in-memory
//! `EntityGraph` or written through a `CatalogRepository`.

#![allow(dead_code)]

use catalog_core::db::open_db_in_memory;
use catalog_core::{
    BusinessKey, CatalogRepository, EntityGraph, EntityKind, SqliteCatalogRepository, StatusInfo,
    VersionedRecord,
};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::Connection;

pub const ORGANIZATION_GUID: &str = "abcdef123456";
pub const COMPANY_BUSINESS_ID: &str = "1710128-9";
pub const MEMBER_INSTANCE: &str = "dev-cs";
pub const MEMBER_CLASS: &str = "PUB";
pub const MEMBER_CODE: &str = "14151328";

/// Company categories modified after 2020-05-06.
pub const LATE_COMPANY_CATEGORIES: [&str; 4] = [
    "BusinessAddress",
    "BusinessName",
    "ContactDetail",
    "RegisteredOffice",
];

pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, second))
        .expect("valid fixture timestamp")
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDateTime {
    at(year, month, day, 0, 0, 0)
}

/// Upper bound shared by every fixture query.
pub fn query_until() -> NaiveDateTime {
    at(2022, 7, 29, 19, 30, 40)
}

/// One record plus the records composed under it.
#[derive(Debug, Clone)]
pub struct FixtureNode {
    pub record: VersionedRecord,
    pub children: Vec<FixtureNode>,
}

impl FixtureNode {
    pub fn leaf(record: VersionedRecord) -> Self {
        Self {
            record,
            children: Vec::new(),
        }
    }

    pub fn with(mut self, child: FixtureNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn count(&self) -> usize {
        1 + self.children.iter().map(FixtureNode::count).sum::<usize>()
    }

    /// Mutable access to the first record of `kind` in depth-first order.
    pub fn find_mut(&mut self, kind: EntityKind) -> Option<&mut VersionedRecord> {
        if self.record.kind == kind {
            return Some(&mut self.record);
        }
        self.children
            .iter_mut()
            .find_map(|child| child.find_mut(kind))
    }

    pub fn to_graph(&self) -> EntityGraph {
        let mut graph = EntityGraph::new(self.record.clone()).expect("fixture root is valid");
        for child in &self.children {
            child.attach_to(&mut graph, self.record.id);
        }
        graph
    }

    fn attach_to(&self, graph: &mut EntityGraph, parent: uuid::Uuid) {
        graph
            .attach(parent, self.record.clone())
            .expect("fixture record attaches");
        for child in &self.children {
            child.attach_to(graph, self.record.id);
        }
    }

    pub fn insert_into<R: CatalogRepository>(&self, repo: &R) {
        repo.insert_root(&self.record).expect("fixture root inserts");
        for child in &self.children {
            child.insert_child_into(repo, self.record.id);
        }
    }

    fn insert_child_into<R: CatalogRepository>(&self, repo: &R, parent: uuid::Uuid) {
        repo.insert_child(parent, &self.record)
            .expect("fixture child inserts");
        for child in &self.children {
            child.insert_child_into(repo, self.record.id);
        }
    }
}

fn record(kind: EntityKind, created: NaiveDateTime, changed: NaiveDateTime) -> VersionedRecord {
    VersionedRecord::new(kind, StatusInfo::with_history(created, changed, None))
}

fn node(kind: EntityKind, created: NaiveDateTime, changed: NaiveDateTime) -> FixtureNode {
    FixtureNode::leaf(record(kind, created, changed))
}

/// Organization `abcdef123456`: everything created after mid 2015, one email
/// modified in September 2019, nothing touched since.
pub fn organization_fixture() -> FixtureNode {
    use EntityKind::*;

    let created = date(2017, 1, 15);
    let changed = date(2018, 6, 1);
    let root = VersionedRecord::root(
        BusinessKey::OrganizationGuid(ORGANIZATION_GUID.to_string()),
        StatusInfo::with_history(date(2016, 3, 1), date(2016, 3, 1), None),
    )
    .with_field("organization_type", "Municipality")
    .with_field("publishing_status", "Published");

    let street_address = node(StreetAddress, created, changed)
        .with(FixtureNode::leaf(
            record(Street, created, changed).with_field("value", "Kauppapuistikko"),
        ))
        .with(node(StreetAddressPostOffice, created, changed))
        .with(
            node(StreetAddressMunicipality, created, changed).with(FixtureNode::leaf(
                record(StreetAddressMunicipalityName, created, changed)
                    .with_field("value", "Vaasa"),
            )),
        )
        .with(node(StreetAddressAdditionalInformation, created, changed));

    let post_office_box_address = node(PostOfficeBoxAddress, created, changed)
        .with(node(PostOfficeBox, created, changed))
        .with(node(PostOfficeBoxAddressPostOffice, created, changed))
        .with(
            node(PostOfficeBoxAddressMunicipality, created, changed)
                .with(node(PostOfficeBoxAddressMunicipalityName, created, changed)),
        )
        .with(node(PostOfficeBoxAddressAdditionalInformation, created, changed));

    FixtureNode::leaf(root)
        .with(FixtureNode::leaf(
            record(OrganizationName, created, changed).with_field("value", "Vaasan kaupunki"),
        ))
        .with(node(OrganizationDescription, created, changed))
        .with(FixtureNode::leaf(
            record(Email, created, date(2019, 9, 1)).with_field("value", "vaasa@vaasa.fi"),
        ))
        .with(FixtureNode::leaf(
            record(Email, created, changed).with_field("value", "kirjaamo@vaasa.fi"),
        ))
        .with(node(PhoneNumber, created, changed))
        .with(node(WebPage, created, changed))
        .with(
            node(Address, created, changed)
                .with(street_address)
                .with(post_office_box_address),
        )
}

/// Company `1710128-9`: stored on 2020-05-05, four categories modified on
/// 2020-05-07, one contact detail removed in early 2021.
pub fn company_fixture() -> FixtureNode {
    use EntityKind::*;

    let stored = at(2020, 5, 5, 9, 0, 0);
    let modified = at(2020, 5, 7, 10, 0, 0);
    let root = VersionedRecord::root(
        BusinessKey::CompanyBusinessId(COMPANY_BUSINESS_ID.to_string()),
        StatusInfo::with_history(at(2020, 5, 5, 8, 0, 0), at(2020, 5, 5, 8, 0, 0), None),
    )
    .with_field("name", "Kaakon Tekstiilikeskus Oy");

    FixtureNode::leaf(root)
        .with(node(BusinessAddress, stored, modified))
        .with(node(BusinessAuxiliaryName, stored, stored))
        .with(node(BusinessIdChange, stored, stored))
        .with(node(BusinessLine, stored, stored))
        .with(FixtureNode::leaf(
            record(BusinessName, stored, modified).with_field("language", "FI"),
        ))
        .with(FixtureNode::leaf(
            record(CompanyForm, stored, stored).with_field("name", "Public limited company"),
        ))
        .with(FixtureNode::leaf(VersionedRecord::new(
            ContactDetail,
            StatusInfo::with_history(stored, modified, Some(date(2021, 2, 1))),
        )))
        .with(node(Language, stored, stored))
        .with(node(Liquidation, stored, stored))
        .with(FixtureNode::leaf(
            record(RegisteredEntry, stored, stored).with_field("description", "Unregistered"),
        ))
        .with(node(RegisteredOffice, stored, modified))
}

/// Member `dev-cs/PUB/14151328` with one subsystem exposing one service that
/// publishes both a WSDL and an OpenAPI description.
pub fn member_fixture() -> FixtureNode {
    use EntityKind::*;

    let stored = date(2021, 1, 1);
    let root = VersionedRecord::root(
        BusinessKey::Member {
            x_road_instance: MEMBER_INSTANCE.to_string(),
            member_class: MEMBER_CLASS.to_string(),
            member_code: MEMBER_CODE.to_string(),
        },
        StatusInfo::with_history(stored, stored, None),
    )
    .with_field("name", "Vaasan kaupunki");

    FixtureNode::leaf(root).with(
        FixtureNode::leaf(record(Subsystem, stored, stored).with_field("code", "catalog")).with(
            FixtureNode::leaf(record(Service, stored, stored).with_field("code", "getListOfServices"))
                .with(node(Wsdl, stored, date(2022, 3, 1)))
                .with(node(OpenApi, stored, stored)),
        ),
    )
}

/// Migrated in-memory database holding every fixture.
pub fn seeded_connection() -> Connection {
    let conn = open_db_in_memory().expect("in-memory db opens");
    {
        let repo = SqliteCatalogRepository::try_new(&conn).expect("migrated connection");
        organization_fixture().insert_into(&repo);
        company_fixture().insert_into(&repo);
        member_fixture().insert_into(&repo);
    }
    conn
}
