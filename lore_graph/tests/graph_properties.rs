//! End-to-end properties of a pipeline run.

use lore_graph::ntriples;
use lore_graph::{
    ClosureEngine, ClosureState, EntityDocument, GraphStore, IssueKind, KnowledgeGraph, Pipeline, PipelineConfig,
    RunReport,
};
use lore_model::{vocab, Category, Identifier, InMemorySource, OntologyConfig, Record, Value};

fn id(name: &str) -> Identifier {
    Identifier::from_name(name)
}

fn world() -> InMemorySource {
    let mut source = InMemorySource::new();
    source.push(
        Record::new(Category::Bosses, 0)
            .with_cell("name", "Godrick the Grafted")
            .with_cell("hp", "6,080")
            .with_cell("location", "Stormveil Castle")
            .with_cell("drops", "['20,000 Runes', 'Remembrance of the Grafted']")
            .with_cell("description", "Lord of Stormveil Castle. Bested Margit, the Fell Omen."),
    );
    source.push(
        Record::new(Category::Bosses, 1)
            .with_cell("name", "Margit, the Fell Omen")
            .with_cell("description", "Margit tests all who would enter Stormveil Castle."),
    );
    source.push(
        Record::new(Category::Bosses, 2)
            .with_cell("name", "Malenia, Blade of Miquella")
            .with_cell("description", "Twin of Miquella. Malenia, Blade of Miquella, never knew defeat."),
    );
    source.push(
        Record::new(Category::Npcs, 0)
            .with_cell("name", "Malenia")
            .with_cell("role", "Rot goddess"),
    );
    source.push(
        Record::new(Category::Locations, 0)
            .with_cell("name", "Stormveil Castle")
            .with_cell("region", "Limgrave")
            .with_cell("bosses", "['Godrick the Grafted', 'Margit, the Fell Omen']"),
    );
    source.push(
        Record::new(Category::Remembrances, 0)
            .with_cell("name", "Remembrance of the Grafted")
            .with_cell("boss", "Godrick the Grafted")
            .with_cell("option 1", "Axe of Godrick"),
    );
    source.push(
        Record::new(Category::Weapons, 0)
            .with_cell("name", "Axe of Godrick")
            .with_cell("category", "Greataxes")
            .with_cell("requirements", "{'Str': '34', 'Dex': '-'}")
            .with_cell("stat scaling", "{'Str': 'D'}"),
    );
    source.push(
        Record::new(Category::Weapons, 1)
            .with_cell("name", "Dagger")
            .with_cell("category", "Daggers")
            .with_cell("requirements", "{'Str': '12', 'Dex': '-'}"),
    );
    for level in 0..=10 {
        source.push(
            Record::new(Category::WeaponUpgrades, 0)
                .with_cell("weapon name", "Dagger")
                .with_cell("upgrade", format!("Dagger +{level}"))
                .with_cell("attack power", format!("{{'Phy': '{}'}}", 75 + level * 5)),
        );
    }
    for level in 0..=5 {
        source.push(
            Record::new(Category::WeaponUpgrades, 0)
                .with_cell("weapon name", "Dagger")
                .with_cell("upgrade", format!("Heavy Dagger +{level}"))
                .with_cell("attack power", format!("{{'Phy': '{}'}}", 100 + level * 7)),
        );
    }
    source
}

fn run() -> (KnowledgeGraph, RunReport) {
    Pipeline::with_defaults().run(&world()).unwrap()
}

#[test]
fn test_remembrance_dropped_by_boss_and_inverse() {
    let (graph, _) = run();
    let remembrance = id("Remembrance of the Grafted");
    let godrick = id("Godrick the Grafted");

    assert_eq!(godrick.as_str(), "GodrickTheGrafted");
    assert!(graph.contains(&remembrance, vocab::DROPPED_BY, &Value::Reference(godrick.clone())));
    assert!(graph.contains(&godrick, vocab::DROPS, &Value::Reference(remembrance)));
}

#[test]
fn test_requirement_placeholder_is_absent() {
    let (graph, _) = run();
    let dagger = id("Dagger");

    assert!(graph.contains(&dagger, "requiresStrength", &Value::integer(12)));
    let dagger_view = graph.entity(&dagger).unwrap();
    assert!(dagger_view.values("requiresDexterity").next().is_none());
}

#[test]
fn test_longest_name_is_the_only_mention() {
    let (graph, _) = run();
    let blade = id("Malenia, Blade of Miquella");

    let mentioned: Vec<&Identifier> = graph.references(&blade, vocab::MENTIONS).collect();
    assert!(mentioned.is_empty(), "self mention or bare-name match: {mentioned:?}");

    let godrick = id("Godrick the Grafted");
    let mentioned: Vec<&Identifier> = graph.references(&godrick, vocab::MENTIONS).collect();
    assert!(mentioned.contains(&&id("Margit, the Fell Omen")));
    assert!(mentioned.contains(&&id("Stormveil Castle")));
    assert_eq!(mentioned.len(), 2);
}

#[test]
fn test_no_entity_mentions_itself() {
    let (graph, _) = run();
    for (subject, object) in graph.with_predicate(vocab::MENTIONS) {
        assert_ne!(object.as_reference(), Some(subject));
    }
}

#[test]
fn test_shadow_nodes_per_path() {
    let (graph, report) = run();
    let dagger = id("Dagger");
    let nodes: Vec<&Identifier> = graph.references(&dagger, vocab::HAS_MAX_STATS).collect();

    assert_eq!(nodes.len(), 2);
    assert_eq!(report.shadow_nodes, 2);

    let standard = Identifier::shadow(&dagger, "Standard");
    let heavy = Identifier::shadow(&dagger, "Heavy");
    assert!(graph.contains(&standard, vocab::UPGRADE_LEVEL, &Value::integer(10)));
    assert!(graph.contains(&standard, "attackPhysical", &Value::float(125.0)));
    assert!(graph.contains(&heavy, vocab::UPGRADE_LEVEL, &Value::integer(5)));
    assert!(graph.contains(&heavy, "attackPhysical", &Value::float(135.0)));
    assert!(graph.has_type(&heavy, vocab::STAT_BLOCK));
}

#[test]
fn test_types_materialized_through_hierarchy() {
    let (graph, _) = run();
    let axe = id("Axe of Godrick");
    let types: Vec<&str> = graph.types_of(&axe).into_iter().map(Identifier::as_str).collect();
    assert_eq!(types, vec!["Greataxe", "Item", "Weapon"]);

    assert!(graph.has_type(&id("Godrick the Grafted"), vocab::AGENT));
    assert!(graph.entities_of_type(vocab::AGENT).count() >= 4);
}

#[test]
fn test_inverse_pairs_hold_in_both_directions() {
    let (graph, _) = run();
    let ontology = OntologyConfig::default();
    for (predicate, partners) in ontology.inverse_map() {
        for (subject, object) in graph.with_predicate(&predicate) {
            let Some(target) = object.as_reference() else {
                continue;
            };
            for partner in &partners {
                assert!(
                    graph.contains(target, partner, &Value::Reference(subject.clone())),
                    "{subject} {predicate} {target} lacks {partner}"
                );
            }
        }
    }
}

#[test]
fn test_second_closure_adds_nothing() {
    let (graph, _) = run();
    let engine = ClosureEngine::from_ontology(&OntologyConfig::default());
    let before = graph.len();
    let (again, report) = engine.run(graph.into_store(), true);

    assert_eq!(report.triples_added(), 0);
    assert_eq!(report.state, ClosureState::Converged);
    assert_eq!(again.len(), before);
}

#[test]
fn test_ntriples_round_trip_is_set_equal() {
    let (graph, _) = run();
    let text = ntriples::to_ntriples(&graph);
    let parsed: GraphStore = ntriples::parse_ntriples(&text).unwrap();

    assert_eq!(parsed.len(), graph.len());
    assert_eq!(parsed, *graph);
}

#[test]
fn test_ntriples_file_round_trip() {
    let (graph, _) = run();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lore.nt");

    ntriples::save(&graph, &path).unwrap();
    let loaded = ntriples::load(&path).unwrap();
    assert_eq!(loaded, *graph);
}

#[test]
fn test_report_accounts_for_run() {
    let (graph, report) = run();

    assert_eq!(report.records_seen, 8);
    assert_eq!(report.records_ingested, 8);
    assert_eq!(report.count(IssueKind::MalformedRecord), 0);
    // "Limgrave" is named only as a region.
    assert_eq!(report.count(IssueKind::UnresolvedReference), 1);
    assert_eq!(report.triples_final, graph.len());

    let json = report.to_json().unwrap();
    assert!(json.contains(&report.run_id.to_string()));
}

#[test]
fn test_documents_resolve_references_to_labels() {
    let (graph, _) = run();
    let doc = EntityDocument::build(&graph, &id("Remembrance of the Grafted")).unwrap();

    assert_eq!(doc.title, "Remembrance of the Grafted");
    assert!(doc
        .facts
        .iter()
        .any(|f| f.predicate == "dropped by" && f.object == "Godrick the Grafted"));

    let predicates: Vec<&str> = doc.facts.iter().map(|f| f.predicate.as_str()).collect();
    let mut sorted = predicates.clone();
    sorted.sort();
    assert_eq!(predicates, sorted);
}

#[test]
fn test_config_file_disables_parallelism() {
    let config = PipelineConfig::from_toml_str("parallel = false").unwrap();
    let (sequential, _) = Pipeline::new(config).run(&world()).unwrap();
    let (parallel, _) = run();
    assert_eq!(sequential, parallel);
}

#[test]
fn test_registered_entities_link_to_external_resources() {
    let (graph, report) = run();
    let godrick = id("Godrick the Grafted");
    let wikidata = Value::external("http://www.wikidata.org/entity/Q111174351");

    assert!(graph.contains(&godrick, vocab::SAME_AS, &wikidata));
    // Godrick and Stormveil Castle are registered; Limgrave is only a stub.
    assert_eq!(report.external_links, 2);
    assert!(graph.with_predicate(vocab::SAME_AS).all(|(_, object)| object.as_external().is_some()));

    let reloaded = ntriples::parse_ntriples(&ntriples::to_ntriples(&graph)).unwrap();
    assert!(reloaded.contains(&godrick, vocab::SAME_AS, &wikidata));
}
