//! Property tests for configuration layering

use ggrama_config::{
    discover_default_search_paths, ConfigOverrides, ConfigResolver, Configuration, StandardDirs,
    MODELS_DIR, PROMPT_TEMPLATES_DIR, SCHEMAS_DIR,
};
use proptest::prelude::*;
use serde_json::{json, Map, Value};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// One generated config file: an optional model name and an optional schema path list.
#[derive(Debug, Clone)]
struct Layer {
    model_name: Option<String>,
    schema_paths: Option<Vec<String>>,
}

fn layer() -> impl Strategy<Value = Layer> {
    (
        proptest::option::of("[a-z]{1,8}"),
        proptest::option::of(proptest::collection::vec("/[a-z]{1,6}", 0..4)),
    )
        .prop_map(|(model_name, schema_paths)| Layer {
            model_name,
            schema_paths,
        })
}

fn write_layers(dir: &TempDir, layers: &[Layer]) -> Vec<PathBuf> {
    layers
        .iter()
        .enumerate()
        .map(|(i, layer)| {
            let mut doc = Map::new();
            if let Some(name) = &layer.model_name {
                doc.insert("model_name".to_string(), json!(name));
            }
            if let Some(paths) = &layer.schema_paths {
                doc.insert("schema_paths".to_string(), json!(paths));
            }
            let path = dir.path().join(format!("layer-{i}.json"));
            fs::write(&path, Value::Object(doc).to_string()).unwrap();
            path
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn last_file_setting_a_key_wins(
        base_paths in proptest::collection::vec("/[a-z]{1,6}", 0..4),
        layers in proptest::collection::vec(layer(), 0..6),
    ) {
        let temp = TempDir::new().unwrap();
        let files = write_layers(&temp, &layers);
        let base = Configuration {
            schema_search_paths: base_paths.iter().map(PathBuf::from).collect(),
            ..Default::default()
        };

        let config = ConfigResolver::with_base(base.clone())
            .resolve(&files, &ConfigOverrides::default())
            .unwrap();

        let expected_model = layers.iter().rev().find_map(|l| l.model_name.clone());
        prop_assert_eq!(config.model_name, expected_model);

        // Lists come from exactly one layer, never a concatenation.
        let expected_paths = layers
            .iter()
            .rev()
            .find_map(|l| l.schema_paths.clone())
            .map(|paths| paths.into_iter().map(PathBuf::from).collect::<Vec<_>>())
            .unwrap_or(base.schema_search_paths);
        prop_assert_eq!(config.schema_search_paths, expected_paths);
    }

    #[test]
    fn command_line_override_beats_every_file(
        layers in proptest::collection::vec(layer(), 1..6),
        cli_model in "[A-Z]{1,8}",
    ) {
        let temp = TempDir::new().unwrap();
        let files = write_layers(&temp, &layers);
        let overrides = ConfigOverrides {
            model_name: Some(cli_model.clone()),
            ..Default::default()
        };

        let config = ConfigResolver::with_base(Configuration::default())
            .resolve(&files, &overrides)
            .unwrap();
        prop_assert_eq!(config.model_name, Some(cli_model));
    }

    #[test]
    fn discovered_search_paths_all_exist(
        roots in proptest::collection::vec((any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()), 0..5),
    ) {
        let temp = TempDir::new().unwrap();
        let mut candidates = Vec::new();
        for (i, (exists, models, schemas, templates)) in roots.iter().enumerate() {
            let root = temp.path().join(format!("root-{i}"));
            if *exists {
                fs::create_dir_all(&root).unwrap();
                for (wanted, sub) in [
                    (models, MODELS_DIR),
                    (schemas, SCHEMAS_DIR),
                    (templates, PROMPT_TEMPLATES_DIR),
                ] {
                    if *wanted {
                        fs::create_dir_all(root.join(sub)).unwrap();
                    }
                }
            }
            candidates.push(root);
        }

        let config = discover_default_search_paths(&StandardDirs::new(candidates));
        for dir in config
            .model_search_paths
            .iter()
            .chain(&config.schema_search_paths)
            .chain(&config.prompt_template_search_paths)
        {
            prop_assert!(dir.is_dir(), "{} does not exist", dir.display());
        }

        let expected_models = roots.iter().filter(|(e, m, _, _)| *e && *m).count();
        prop_assert_eq!(config.model_search_paths.len(), expected_models);
    }
}
