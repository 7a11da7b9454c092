use listmap::{
    adapter::{BinaryContent, EnumMapping, GenericAdapter, LazyContent},
    property, CollectionHandle, Entity, EntityMapBuilder, FieldValue, FileInclusion,
    Parameters, Property, Result,
};
use listmap_repository_memory::Operation;
use tests::{
    models::{Address, Contact, Document, Note, Order, Status},
    ListmapTest,
};

use pretty_assertions::assert_eq;

fn home() -> Address {
    Address {
        street: "Storgata 1".to_string(),
        city: "Bergen".to_string(),
    }
}

#[test]
fn value_object_round_trips_through_one_field() {
    let test = ListmapTest::new();
    let manager = test.manager::<Contact>();

    let mut contact = Contact {
        full_name: "Kari".to_string(),
        address: Some(home()),
        ..Contact::default()
    };
    manager.create(&mut contact).unwrap();

    let raw = test.repo.raw_item(&CollectionHandle::list("Contact"), contact.id).unwrap();
    let Some(FieldValue::Text(json)) = raw.get("Address") else {
        panic!("address is not stored as text: {raw:?}");
    };
    assert!(json.contains("Bergen"));

    assert_eq!(manager.get(contact.id).unwrap(), contact);
}

#[test]
fn missing_value_object_is_none() {
    let test = ListmapTest::new();
    let manager = test.manager::<Contact>();

    let mut contact = Contact {
        full_name: "Ola".to_string(),
        ..Contact::default()
    };
    manager.create(&mut contact).unwrap();

    let raw = test.repo.raw_item(&CollectionHandle::list("Contact"), contact.id).unwrap();
    assert_eq!(raw.get("Address"), None);
    assert_eq!(manager.get(contact.id).unwrap().address, None);
}

#[test]
fn value_object_cannot_be_compared() {
    let test = ListmapTest::new();
    let manager = test.manager::<Contact>();

    let err = manager.translate(&Contact::ADDRESS.eq(Some(home()))).unwrap_err();
    assert!(err.is_unsupported_predicate());
}

/// A stop on a route. The city text and the state are resolved by the
/// store for list items, but inside a value object they are plain JSON.
#[derive(Debug, Default, Clone, PartialEq)]
struct Stop {
    city_id: i32,
    city: String,
    state: Status,
    note: String,
}

impl Entity for Stop {
    const NAME: &'static str = "Stop";

    fn map(map: &mut EntityMapBuilder<'_, Self>) -> Result<()> {
        map.map_lookup_id(property!(Stop, city_id), "City")?;
        map.map_lookup_value(property!(Stop, city), "City")?;
        map.map_enum(property!(Stop, state), "State", EnumMapping::lookup_value().empty(Status::None))?;
        map.map_with(
            property!(Stop, note),
            "Note",
            GenericAdapter::new(|value: FieldValue| Ok(value.as_str().unwrap_or_default().to_string())),
        )
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Route {
    id: i32,
    name: String,
    stops: Vec<Stop>,
}

impl Route {
    const STOPS: Property<Route, Vec<Stop>> = property!(Route, stops);
}

impl Entity for Route {
    const NAME: &'static str = "Route";

    fn map(map: &mut EntityMapBuilder<'_, Self>) -> Result<()> {
        map.register_identifier(property!(Route, id))?;
        map.map_field(property!(Route, name), "Title")?;
        map.map_value_objects(Self::STOPS, "Stops")
    }
}

#[test]
fn value_object_list_keeps_read_only_parts() {
    let test = ListmapTest::new();
    let manager = test.manager::<Route>();

    let mut route = Route {
        name: "Coast".to_string(),
        stops: vec![
            Stop {
                city_id: 1,
                city: "Oslo".to_string(),
                state: Status::Open,
                ..Stop::default()
            },
            Stop {
                city_id: 2,
                city: "Bergen".to_string(),
                state: Status::Closed,
                ..Stop::default()
            },
        ],
        ..Route::default()
    };
    manager.create(&mut route).unwrap();

    let raw = test.repo.raw_item(&CollectionHandle::list("Route"), route.id).unwrap();
    let Some(FieldValue::Text(json)) = raw.get("Stops") else {
        panic!("stops are not stored as text: {raw:?}");
    };
    assert!(json.contains("Bergen"));
    assert!(json.contains("Closed"));
    // No conversion back to a field value
    assert!(!json.contains("Note"));

    assert_eq!(manager.get(route.id).unwrap(), route);

    let mut updatable = manager.get_updatable(route.id).unwrap();
    updatable.stops.pop();
    manager.update(&mut updatable).unwrap();
    assert_eq!(manager.get(route.id).unwrap().stops, route.stops[..1].to_vec());
}

#[test]
fn create_file_stores_the_document() {
    let test = ListmapTest::new();
    let manager = test.manager::<Document>();

    let mut document = Document {
        title: "Report".to_string(),
        file: Some(BinaryContent::new("report.txt", b"quarterly".to_vec())),
        ..Document::default()
    };
    assert!(manager.create_file(&mut document).unwrap());

    assert_eq!(
        test.repo.operations().last(),
        Some(&Operation::CreateFile {
            list: "Document".to_string(),
            id: document.id,
            name: "report.txt".to_string(),
        })
    );
    assert_eq!(manager.get(document.id).unwrap(), document);
}

#[test]
fn create_file_needs_content() {
    let test = ListmapTest::new();
    let manager = test.manager::<Document>();

    let mut document = Document {
        title: "Empty".to_string(),
        ..Document::default()
    };
    let err = manager.create_file(&mut document).unwrap_err();
    assert!(err.is_invalid_operation());

    let err = test.manager::<Order>().create_file(&mut Order::default()).unwrap_err();
    assert!(err.is_invalid_operation());
}

#[test]
fn update_replaces_the_file() {
    let test = ListmapTest::new();
    let manager = test.manager::<Document>();

    let mut document = Document {
        title: "Report".to_string(),
        file: Some(BinaryContent::new("report.txt", b"v1".to_vec())),
        ..Document::default()
    };
    manager.create_file(&mut document).unwrap();

    let mut updatable = manager.get_updatable(document.id).unwrap();
    updatable.file = Some(BinaryContent::new("report.txt", b"v2".to_vec()));
    manager.update(&mut updatable).unwrap();

    let file = manager.get(document.id).unwrap().file.unwrap();
    assert_eq!(file.bytes, b"v2");
}

#[test]
fn attachments_are_saved_after_create() {
    let test = ListmapTest::new();
    let manager = test.manager::<Note>();

    let mut note = Note {
        title: "Trip".to_string(),
        attachments: vec![
            BinaryContent::new("a.txt", b"first".to_vec()),
            BinaryContent::new("b.txt", b"second".to_vec()),
        ],
        ..Note::default()
    };
    manager.create(&mut note).unwrap();

    let writes: Vec<_> = test
        .repo
        .operations()
        .into_iter()
        .filter(Operation::is_write)
        .collect();
    assert_eq!(
        writes,
        [
            Operation::Create { list: "Note".to_string(), id: note.id },
            Operation::SaveAttachments { list: "Note".to_string(), id: note.id },
        ]
    );
    assert_eq!(manager.get(note.id).unwrap().attachments, note.attachments);
}

#[test]
fn attachments_can_be_left_out_of_a_call() {
    let test = ListmapTest::new();
    let manager = test.manager::<Note>();

    let mut note = Note {
        title: "Trip".to_string(),
        attachments: vec![BinaryContent::new("a.txt", b"first".to_vec())],
        ..Note::default()
    };
    manager.create(&mut note).unwrap();

    let loaded = manager
        .get_with(note.id, Parameters::new().include_attachments(false))
        .unwrap();
    assert!(loaded.attachments.is_empty());

    // An update without attachments keeps the stored ones
    let mut updatable = manager
        .try_get_updatable_with(note.id, Parameters::new().include_attachments(false))
        .unwrap()
        .unwrap();
    updatable.title = "Holiday".to_string();
    manager
        .update_with(&mut updatable, Parameters::new().include_attachments(false))
        .unwrap();
    assert_eq!(
        test.repo.raw_attachments(&CollectionHandle::list("Note"), note.id),
        [("a.txt".to_string(), b"first".to_vec())]
    );
}

#[derive(Debug, Default)]
struct Scan {
    id: i32,
    pages: Vec<LazyContent>,
}

impl Scan {
    const ID: Property<Scan, i32> = property!(Scan, id);
    const PAGES: Property<Scan, Vec<LazyContent>> = property!(Scan, pages);
}

impl Entity for Scan {
    const NAME: &'static str = "Scan";

    fn map(map: &mut EntityMapBuilder<'_, Self>) -> Result<()> {
        map.register_identifier(Self::ID)?;
        map.map_attachments(Self::PAGES)?;
        map.file_inclusion(FileInclusion::OnDemand);
        Ok(())
    }
}

#[test]
fn lazy_attachments_load_on_first_use() {
    let test = ListmapTest::new();
    let manager = test.manager::<Scan>();

    let mut scan = Scan {
        pages: vec![LazyContent::new("p1.png", b"page one".to_vec())],
        ..Scan::default()
    };
    manager
        .create_with(&mut scan, Parameters::new().include_attachments(true))
        .unwrap();

    // On demand: nothing is loaded unless asked for
    assert!(manager.get(scan.id).unwrap().pages.is_empty());

    let loaded = manager
        .get_with(scan.id, Parameters::new().include_attachments(true))
        .unwrap();
    assert_eq!(loaded.pages.len(), 1);
    assert_eq!(loaded.pages[0].name, "p1.png");
    assert_eq!(loaded.pages[0].load().unwrap(), b"page one");
}
