// ABOUTME: Integration tests for merging application manifests into an appstack.
// ABOUTME: Covers the per-key merge rules and reading manifests from artifacts.

mod support;

use cfstack::appstack::*;
use cfstack::error::Error;
use cfstack::manifest::{MANIFEST_FILENAME, read_manifests};
use serde_yaml::Mapping;
use std::fs;
use std::io::Write;
use support::app;

fn mapping(yaml: &str) -> Mapping {
    serde_yaml::from_str(yaml).unwrap()
}

fn with_properties(name: &str, yaml: &str) -> AppConfig {
    let mut config = app(name);
    config.app_properties = mapping(yaml);
    config
}

mod rules {
    use super::*;

    #[test]
    fn nested_maps_merge_and_stack_scalars_win() {
        let config = with_properties(
            "test_app",
            "env:\n  one: stack_1\n  two: stack_2\ndisk_quota: 256M\n",
        );
        let manifest = mapping(
            "disk_quota: 128M\ninstances: \"1\"\nenv:\n  two: manifest_2\n  three: manifest_3\n",
        );

        let merged = merge_manifest(&config, &manifest);

        assert_eq!(
            merged.app_properties,
            mapping(
                "env:\n  one: stack_1\n  two: stack_2\n  three: manifest_3\n\
                 disk_quota: 256M\ninstances: \"1\"\nname: test_app\n"
            )
        );
    }

    #[test]
    fn manifest_only_map_is_adopted() {
        let config = with_properties("test_app", "disk_quota: 512M\n");
        let manifest = mapping("env:\n  test_env: test_env_val\n");

        let merged = merge_manifest(&config, &manifest);

        assert_eq!(
            merged.app_properties,
            mapping("disk_quota: 512M\nenv:\n  test_env: test_env_val\nname: test_app\n")
        );
    }

    #[test]
    fn service_lists_are_joined_without_duplicates() {
        let config = app("test_app").requiring(["a", "b"]);
        let manifest = mapping("services: [c, a]\n");

        let merged = merge_manifest(&config, &manifest);

        assert_eq!(merged.required_services().unwrap(), vec!["c", "a", "b"]);
    }

    #[test]
    fn empty_stack_properties_take_manifest() {
        let merged = merge_manifest(&app("test_app"), &mapping("disk_quota: 512M\n"));
        assert_eq!(
            merged.app_properties,
            mapping("disk_quota: 512M\nname: test_app\n")
        );
    }

    #[test]
    fn empty_stack_value_takes_manifest() {
        let config = with_properties("test_app", "services:\nmemory: 1G\n");
        let merged = merge_manifest(&config, &mapping("services: [db]\n"));

        assert_eq!(merged.required_services().unwrap(), vec!["db"]);
    }

    #[test]
    fn manifest_services_of_empty_stack_key_still_need_a_provider() {
        let stack = AppStack::new(vec![with_properties("web", "services: ~\n")]).unwrap();
        let mut manifests = Manifests::new();
        manifests.insert("web".to_string(), mapping("services: [db]\n"));

        let err = cfstack::order::expand(&stack, &manifests).unwrap_err();
        assert!(matches!(err, StackError::UndefinedService { .. }));
    }

    #[test]
    fn explicit_name_is_kept() {
        let config = with_properties("test_app", "name: pushed-as\n");
        let merged = merge_manifest(&config, &mapping("name: from-manifest\n"));
        assert_eq!(merged.app_properties, mapping("name: pushed-as\n"));
    }

    #[test]
    fn type_mismatch_keeps_stack_value() {
        support::init_tracing();
        let config = with_properties("test_app", "env: plain\n");
        let merged = merge_manifest(&config, &mapping("env:\n  k: v\n"));
        assert_eq!(merged.app_properties, mapping("env: plain\nname: test_app\n"));
    }

    #[test]
    fn merging_twice_changes_nothing() {
        let config = with_properties("test_app", "env:\n  a: \"1\"\nservices: [x]\n");
        let manifest = mapping("env:\n  b: \"2\"\nservices: [y, x]\nmemory: 1G\n");

        let once = merge_manifest(&config, &manifest);
        let twice = merge_manifest(&once, &manifest);
        assert_eq!(once, twice);
    }

    #[test]
    fn only_properties_change() {
        let config = app("test_app")
            .with_order(3)
            .providing(UserProvidedService::new("svc"));
        let merged = merge_manifest(&config, &mapping("memory: 1G\n"));

        assert_eq!(merged.order, Some(3));
        assert_eq!(merged.user_provided_services, config.user_provided_services);
        assert_eq!(merged.artifact_name, config.artifact_name);
    }
}

mod stacks {
    use super::*;

    #[test]
    fn manifests_are_matched_by_artifact_name() {
        let stack = AppStack::new(vec![
            app("frontend").with_artifact_name("ui"),
            app("backend"),
        ])
        .unwrap();
        let mut manifests = Manifests::new();
        manifests.insert("ui".to_string(), mapping("memory: 1G\n"));
        manifests.insert("frontend".to_string(), mapping("memory: 9G\n"));

        let merged = stack.merge_manifests(&manifests);

        assert_eq!(
            merged.apps[0].app_properties,
            mapping("memory: 1G\nname: frontend\n")
        );
        assert_eq!(merged.apps[1].app_properties, mapping("name: backend\n"));
    }

    #[test]
    fn merged_stack_is_stable_without_manifests() {
        let stack = AppStack::new(vec![
            with_properties("a", "env:\n  k: v\n"),
            app("b").requiring(["svc"]),
        ])
        .unwrap();

        let merged = stack.merge_manifests(&Manifests::new());

        assert_eq!(merged.merge_manifests(&Manifests::new()), merged);
    }

    #[test]
    fn input_stack_is_untouched() {
        let stack = AppStack::new(vec![app("a")]).unwrap();
        let before = stack.clone();
        let mut manifests = Manifests::new();
        manifests.insert("a".to_string(), mapping("memory: 1G\n"));

        let merged = stack.merge_manifests(&manifests);

        assert_eq!(stack, before);
        assert_ne!(merged, before);
    }
}

mod artifacts {
    use super::*;

    fn write_artifact(root: &std::path::Path, dir: &str, manifest: &str) {
        let path = root.join(dir);
        fs::create_dir_all(&path).unwrap();
        fs::write(path.join(MANIFEST_FILENAME), manifest).unwrap();
    }

    fn write_zip(root: &std::path::Path, name: &str, files: &[(&str, &str)]) {
        let file = fs::File::create(root.join(name)).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);
        for (path, content) in files {
            zip.start_file(*path, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn reads_manifests_from_zip_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        write_zip(
            dir.path(),
            "console-v1.2.3.zip",
            &[
                ("bin/console", "#!/bin/sh\n"),
                (MANIFEST_FILENAME, "applications:\n  - name: console\n    memory: 512M\n"),
            ],
        );
        write_zip(dir.path(), "tools-0.1.zip", &[("README", "no manifest here")]);

        let manifests = read_manifests(dir.path()).unwrap();

        assert_eq!(manifests.len(), 1);
        assert_eq!(
            manifests["console"],
            mapping("name: console\nmemory: 512M\n")
        );
    }

    #[test]
    fn corrupt_zip_is_an_archive_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("broken-1.0.zip"), "not a zip").unwrap();

        let result = read_manifests(dir.path());
        assert!(matches!(result, Err(Error::Archive { .. })));
    }

    #[test]
    fn reads_first_application_of_each_artifact() {
        let dir = tempfile::tempdir().unwrap();
        write_artifact(
            dir.path(),
            "console-v1.2.3",
            "applications:\n  - name: console\n    memory: 512M\n  - name: ignored\n",
        );
        write_artifact(dir.path(), "router-0.9", "applications:\n  - memory: 64M\n");
        fs::create_dir_all(dir.path().join("no-manifest")).unwrap();
        fs::write(dir.path().join("stray.txt"), "not an artifact").unwrap();

        let manifests = read_manifests(dir.path()).unwrap();

        assert_eq!(manifests.len(), 2);
        assert_eq!(
            manifests["console"],
            mapping("name: console\nmemory: 512M\n")
        );
        assert_eq!(manifests["router"], mapping("memory: 64M\n"));
    }

    #[test]
    fn manifest_without_applications_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        write_artifact(dir.path(), "broken", "applications: []\n");

        let result = read_manifests(dir.path());
        assert!(matches!(result, Err(Error::InvalidManifest { .. })));
    }

    #[test]
    fn missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_manifests(&dir.path().join("nope"));
        assert!(matches!(result, Err(Error::ArtifactsNotFound(_))));
    }
}
