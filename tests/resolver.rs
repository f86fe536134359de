#![allow(clippy::pedantic)]
use std::path::Path;
use std::sync::Arc;

use floorplan_inventory::{
    AreaIndex, ColumnSpec, Dataset, LabelSource, LoadOptions, MapElement, MapSource, NoTitles,
    Resolution, canonical_key, normalize,
};

fn dataset(headers: &[&str], rows: &[&[&str]]) -> Arc<Dataset> {
    Arc::new(Dataset::from_rows(
        headers.iter().map(|h| (*h).to_owned()).collect(),
        rows.iter().map(|row| row.iter().copied()),
    ))
}

fn fixture_index() -> (AreaIndex, MapSource) {
    let data = Dataset::open(
        Path::new("tests/fixtures/inventario.csv"),
        &LoadOptions::new(),
    )
    .expect("failed to load inventory fixture");
    let map = MapSource::load(Path::new("tests/fixtures/mapa.svg"))
        .expect("failed to load map fixture");
    let index =
        AreaIndex::build(Arc::new(data), &ColumnSpec::new()).expect("failed to index fixture");
    (index, map)
}

fn names<'a>(resolution: &Resolution<'a>) -> Vec<&'a str> {
    resolution
        .records()
        .iter()
        .copied()
        .map(|record| record.field(0))
        .collect()
}

#[test]
fn normalizer_properties() {
    assert_eq!(normalize(Some("Área Norte")).as_str(), "AREA_NORTE");
    assert_eq!(
        normalize(Some("Área Norte")),
        normalize(Some("AREA_NORTE"))
    );
    assert_eq!(
        normalize(Some("Área Norte")),
        normalize(Some("área   norte".to_uppercase().as_str()))
    );
    assert_eq!(normalize(None), normalize(Some("")));
    assert_eq!(normalize(None).as_str(), "");
    for label in ["Recepción", "  sala  de juntas", "WH-07", "ÁREA_NORTE"] {
        let once = canonical_key(label);
        assert_eq!(canonical_key(once.as_str()), once);
    }
}

#[test]
fn clicking_lobby_returns_ana_with_map_title() {
    let index = AreaIndex::build(
        dataset(
            &["Nombre", "Location"],
            &[&["Ana", "Lobby"], &["Luis", "Oficina 2"]],
        ),
        &ColumnSpec::new(),
    )
    .unwrap();
    let map = MapSource::from_elements([MapElement {
        id: "LOBBY".to_owned(),
        area_tag: None,
        title: Some("Recepción".to_owned()),
    }]);

    let resolution = index.resolve(&map, Some("LOBBY"));
    assert_eq!(names(&resolution), ["Ana"]);
    assert_eq!(resolution.label(), "Recepción");
    assert_eq!(
        resolution.area_label().map(|label| label.source),
        Some(LabelSource::MapTitle)
    );
}

#[test]
fn any_of_three_keys_reaches_the_record() {
    let index = AreaIndex::build(
        dataset(
            &["Nombre", "SVG_ID", "Location", "Oracle Location"],
            &[&["Ana", "R7", "Almacén", "WH-07"], &["Luis", "R8", "Lobby", "RC-01"]],
        ),
        &ColumnSpec::new(),
    )
    .unwrap();
    for click in ["R7", "Almacén", "WH-07", "almacen", "wh-07"] {
        let resolution = index.resolve(&NoTitles, Some(click));
        assert_eq!(names(&resolution), ["Ana"], "click {click:?}");
    }
}

#[test]
fn no_match_and_no_selection_are_distinct() {
    let index = AreaIndex::build(
        dataset(&["Nombre", "Location"], &[&["Ana", "Lobby"]]),
        &ColumnSpec::new(),
    )
    .unwrap();

    let unselected = index.resolve(&NoTitles, None);
    assert!(unselected.records().is_empty());
    assert_eq!(unselected.label(), "");

    let missing = index.resolve(&NoTitles, Some("ZZZ_NONEXISTENT"));
    assert!(missing.records().is_empty());
    assert_eq!(missing.label(), "ZZZ_NONEXISTENT");
    assert!(matches!(missing, Resolution::NoData { .. }));
    assert_ne!(missing, unselected);
}

#[test]
fn fixture_columns_are_detected() {
    let (index, _) = fixture_index();
    let columns = index.columns();
    assert_eq!(index.dataset().headers()[columns.location], "Locación");
    assert_eq!(columns.map_id, Some(2));
    assert_eq!(columns.secondary, Some(4));
    assert_eq!(columns.name, Some(0));
    assert_eq!(columns.activity, Some(1));
    assert_eq!(index.dataset().len(), 6);
    assert_eq!(index.unlabeled().len(), 1);
}

#[test]
fn fixture_clicks_resolve_against_every_source() {
    let (index, map) = fixture_index();

    let warehouse = index.resolve(&map, Some("Almacén"));
    assert_eq!(names(&warehouse), ["José Pérez", "María López"]);
    assert_eq!(warehouse.label(), "Almacén");

    let oracle = index.resolve(&map, Some("WH-07"));
    assert_eq!(names(&oracle), ["José Pérez", "María López"]);

    let by_map_id = index.resolve(&map, Some("R7"));
    assert_eq!(names(&by_map_id), ["José Pérez"]);
    assert_eq!(by_map_id.label(), "Almacén general");

    let office = index.resolve(&map, Some("OF2"));
    assert_eq!(names(&office), ["Luis Gómez"]);
    assert_eq!(office.label(), "Oficina 2");

    let kitchen = index.resolve(&map, Some("COCINA"));
    assert!(matches!(kitchen, Resolution::NoData { .. }));
    assert_eq!(kitchen.label(), "Cocina");
}

#[test]
fn fixture_coverage_report() {
    let (index, map) = fixture_index();
    let coverage = index.coverage(&map);
    insta::assert_json_snapshot!(coverage, @r#"
    [
      {
        "id": "planta",
        "key": "PLANTA",
        "label": "planta",
        "label_source": "raw_id",
        "records": 0
      },
      {
        "id": "LOBBY",
        "key": "LOBBY",
        "label": "Recepción",
        "label_source": "map_title",
        "records": 1
      },
      {
        "id": "OF2",
        "key": "OF2",
        "label": "Oficina 2",
        "label_source": "dataset",
        "records": 1
      },
      {
        "id": "R7",
        "key": "R7",
        "label": "Almacén general",
        "label_source": "map_title",
        "records": 1
      },
      {
        "id": "COCINA",
        "key": "COCINA",
        "label": "Cocina",
        "label_source": "map_title",
        "records": 0
      }
    ]
    "#);

    let orphans: Vec<String> = index
        .orphan_keys(&map)
        .into_iter()
        .map(|key| key.into_string())
        .collect();
    assert_eq!(orphans, ["ALMACEN", "OFICINA_2", "SALA_DE_JUNTAS"]);
}
