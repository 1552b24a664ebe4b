use chrono::NaiveDate;
use tablestore::{
    DateInterval, Database, FieldType, Schema, Store, StoreConfig, StoreError, Value,
};
use tempfile::TempDir;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn store(tmp: &TempDir) -> Store {
    Store::new(StoreConfig::new(tmp.path()).with_sync_writes(false))
}

#[test]
fn test_shop_round_trip() {
    let tmp = TempDir::new().unwrap();
    let store = store(&tmp);

    let mut db = Database::new("Shop");
    let schema = Schema::new([("id", FieldType::Integer), ("label", FieldType::Text)]).unwrap();
    let items = db.create_table("items", schema.clone()).unwrap();
    items.add_row(vec![Value::Integer(1), Value::from("a")]).unwrap();
    items.add_row(vec![Value::Integer(2), Value::from("b")]).unwrap();

    let path = store.save(&db).unwrap();
    assert_eq!(path, tmp.path().join("Shop.db"));

    let loaded = store.load("Shop").unwrap();
    assert_eq!(loaded, db);
    let items = loaded.table("items").unwrap();
    assert_eq!(items.schema(), &schema);
    assert_eq!(
        items.view_rows(),
        &[
            vec![Value::Integer(1), Value::from("a")],
            vec![Value::Integer(2), Value::from("b")],
        ]
    );
}

#[test]
fn test_round_trip_preserves_every_type() {
    let tmp = TempDir::new().unwrap();
    let store = store(&tmp);

    let mut db = Database::new("everything");
    let schema =
        Schema::parse("n:int, x:real, c:char, s:string, d:date, span:dateInvl").unwrap();
    let table = db.create_table("all", schema).unwrap();
    let rows = vec![
        vec![
            Value::Integer(-7),
            Value::Real(std::f64::consts::PI),
            Value::from('ж'),
            Value::from("multi word text"),
            Value::Date(date(1999, 12, 31)),
            Value::DateInterval(DateInterval::new(date(2024, 1, 1), date(2024, 12, 31)).unwrap()),
        ],
        vec![
            Value::Integer(i64::MAX),
            Value::Real(f64::MIN_POSITIVE),
            Value::from('z'),
            Value::from(""),
            Value::Date(date(2024, 2, 29)),
            Value::DateInterval(DateInterval::new(date(2000, 6, 1), date(2000, 6, 1)).unwrap()),
        ],
    ];
    for row in &rows {
        table.add_row(row.clone()).unwrap();
    }
    db.create_table("second", Schema::parse("id:int").unwrap()).unwrap();

    store.save(&db).unwrap();
    let loaded = store.load("everything").unwrap();

    assert_eq!(loaded.table_names(), vec!["all", "second"]);
    assert_eq!(loaded.table("all").unwrap().view_rows(), rows.as_slice());
    assert_eq!(loaded, db);
}

#[test]
fn test_damaged_file_is_corrupt() {
    let tmp = TempDir::new().unwrap();
    let store = store(&tmp);

    let mut db = Database::new("Shop");
    db.create_table("items", Schema::parse("id:int").unwrap())
        .unwrap()
        .add_row(vec![Value::Integer(5)])
        .unwrap();
    let path = store.save(&db).unwrap();

    let mut bytes = std::fs::read(&path).unwrap();
    let middle = bytes.len() / 2;
    bytes[middle] ^= 0xFF;
    std::fs::write(&path, &bytes).unwrap();

    assert!(matches!(store.load("Shop"), Err(StoreError::CorruptStore(_))));
}

#[test]
fn test_edit_delete_then_reload() {
    let tmp = TempDir::new().unwrap();
    let store = store(&tmp);

    let mut db = Database::new("People");
    let users = db
        .create_table("users", Schema::parse("id:int, name:string, dob:date").unwrap())
        .unwrap();
    for (id, name) in [(1, "John"), (2, "Jane"), (3, "Ann")] {
        users
            .add_row(vec![Value::Integer(id), Value::from(name), Value::Date(date(1990, 1, id as u32))])
            .unwrap();
    }
    users
        .edit_row(2, vec![Value::Integer(3), Value::from("Anna"), Value::Date(date(1990, 1, 3))])
        .unwrap();
    users.delete_row(0).unwrap();
    store.save(&db).unwrap();

    let loaded = store.load("People").unwrap();
    let names: Vec<String> = loaded
        .table("users")
        .unwrap()
        .view_rows()
        .iter()
        .map(|row| row[1].to_string())
        .collect();
    assert_eq!(names, vec!["Jane", "Anna"]);
}
