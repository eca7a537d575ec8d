// ABOUTME: Integration tests for appstack parsing, validation and persistence.
// ABOUTME: Covers malformed records, register_in checks and YAML round-trips.

mod support;

use cfstack::appstack::*;
use cfstack::error::Error;
use std::fs;
use support::app;

const FULL_STACK: &str = r#"
domain: apps.example.com
buildpacks:
  - java_buildpack
user_provided_services:
  - name: logstash
    credentials:
      syslog_drain_url: syslog://logs.example.com:514
brokers:
  - name: docker-broker
    url: http://docker-broker.example.com
    auth_username: admin
    auth_password: secret
    service_instances:
      - name: mongodb-instance
        plan: free
        label: mongodb
security_groups:
  - name: databases
    protocol: tcp
    destination: 10.0.0.0/24
    ports: "5432"
apps:
  - name: eureka
    order: 0
  - name: frontend
    artifact_name: ui
    register_in: eureka
    app_properties:
      memory: 512M
      services:
        - backend-api
        - logstash
    push_options:
      params: --no-start
  - name: backend
    app_properties:
      services:
        - mongodb-instance
    user_provided_services:
      - name: backend-api
        credentials:
          url: http://backend.apps.example.com
"#;

mod parsing {
    use super::*;

    #[test]
    fn parse_full_stack() {
        let stack = AppStack::from_yaml(FULL_STACK).unwrap();

        assert_eq!(stack.domain, "apps.example.com");
        assert_eq!(stack.buildpacks, vec!["java_buildpack"]);
        assert_eq!(stack.user_provided_services[0].name, "logstash");
        assert_eq!(stack.security_groups[0].ports, "5432");
        assert_eq!(stack.apps.len(), 3);

        let broker = &stack.brokers[0];
        assert_eq!(broker.service_instances[0].offering(broker), "mongodb");

        let frontend = stack.app("frontend").unwrap();
        assert_eq!(frontend.artifact_name, "ui");
        assert_eq!(frontend.register_in.as_ref().unwrap(), "eureka");
        assert_eq!(frontend.push_options.params, "--no-start");
        assert_eq!(
            frontend.required_services().unwrap(),
            vec!["backend-api", "logstash"]
        );

        let backend = stack.app("backend").unwrap();
        assert_eq!(backend.artifact_name, "backend");
        assert_eq!(backend.provided_services().collect::<Vec<_>>(), vec!["backend-api"]);
    }

    #[test]
    fn minimal_app_gets_defaults() {
        let stack = AppStack::from_yaml("apps:\n  - name: solo\n").unwrap();
        let solo = &stack.apps[0];

        assert_eq!(solo.artifact_name, "solo");
        assert!(solo.push_if);
        assert!(solo.order.is_none());
        assert!(solo.register_in.is_none());
        assert!(solo.required_services().unwrap().is_empty());
    }

    #[test]
    fn empty_document_is_an_empty_stack() {
        let stack = AppStack::from_yaml("{}").unwrap();
        assert!(stack.apps.is_empty());
        assert_eq!(stack, AppStack::default());
    }

    #[test]
    fn negative_order_and_push_if() {
        let yaml = "apps:\n  - name: last\n    order: -1\n    push_if: false\n";
        let stack = AppStack::from_yaml(yaml).unwrap();
        assert_eq!(stack.apps[0].order, Some(-1));
        assert!(!stack.apps[0].push_if);
    }

    #[test]
    fn empty_register_in_means_none() {
        let yaml = "apps:\n  - name: a\n    register_in: \"\"\n";
        let stack = AppStack::from_yaml(yaml).unwrap();
        assert!(stack.apps[0].register_in.is_none());
    }
}

mod malformed {
    use super::*;

    fn stack_error(yaml: &str) -> StackError {
        match AppStack::from_yaml(yaml) {
            Err(Error::Stack(e)) => e,
            other => panic!("expected a stack error, got {other:?}"),
        }
    }

    #[test]
    fn missing_name() {
        let err = stack_error("apps:\n  - name: a\n  - artifact_name: b\n");
        assert_eq!(err, StackError::MissingAppName { position: 1 });
    }

    #[test]
    fn empty_name() {
        let err = stack_error("apps:\n  - name: \"\"\n");
        assert_eq!(err, StackError::MissingAppName { position: 0 });
    }

    #[test]
    fn name_not_a_string() {
        let err = stack_error("apps:\n  - name: [a, b]\n");
        assert_eq!(err, StackError::NameNotString { position: 0 });
    }

    #[test]
    fn order_not_an_integer() {
        let err = stack_error("apps:\n  - name: a\n    order: first\n");
        assert!(matches!(err, StackError::OrderNotInteger { .. }));

        let err = stack_error("apps:\n  - name: a\n    order: 1.5\n");
        assert!(matches!(err, StackError::OrderNotInteger { .. }));
    }

    #[test]
    fn misspelled_app_field() {
        let err = stack_error("apps:\n  - name: a\n    registerin: b\n    ordr: 3\n");
        assert_eq!(
            err,
            StackError::UnknownAppField {
                position: 0,
                field: "ordr".to_string(),
            }
        );
        assert!(err.to_string().starts_with("application configuration malformed"));
    }

    #[test]
    fn register_in_unknown_app() {
        let err = stack_error("apps:\n  - name: a\n    register_in: registry\n");
        assert_eq!(
            err,
            StackError::UnknownRegistrator {
                app: cfstack::types::AppName::new("a").unwrap(),
                register_in: "registry".to_string(),
            }
        );
        assert!(err.to_string().contains("nonexistent app: registry"));
    }

    #[test]
    fn services_not_a_list() {
        let stack = AppStack::from_yaml(
            "apps:\n  - name: a\n    app_properties:\n      services: mongodb\n",
        )
        .unwrap();
        let err = stack.apps[0].required_services().unwrap_err();
        assert!(matches!(err, StackError::ServicesNotNames { .. }));
    }

    #[test]
    fn invalid_yaml_is_a_yaml_error() {
        let result = AppStack::from_yaml("apps: [");
        assert!(matches!(result, Err(Error::Yaml(_))));
    }
}

mod persistence {
    use super::*;

    #[test]
    fn yaml_round_trip() {
        let stack = AppStack::from_yaml(FULL_STACK).unwrap();
        let yaml = stack.to_yaml().unwrap();
        assert_eq!(AppStack::from_yaml(&yaml).unwrap(), stack);
    }

    #[test]
    fn defaults_are_not_written() {
        let stack = AppStack::new(vec![app("solo")]).unwrap();
        let yaml = stack.to_yaml().unwrap();
        assert!(!yaml.contains("push_if"));
        assert!(!yaml.contains("order"));
        assert!(!yaml.contains("push_options"));
    }

    #[test]
    fn push_if_false_survives_round_trip() {
        let stack = AppStack::new(vec![app("off").with_push_if(false)]).unwrap();
        let reloaded = AppStack::from_yaml(&stack.to_yaml().unwrap()).unwrap();
        assert!(!reloaded.apps[0].push_if);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(EXPANDED_APPSTACK_FILENAME);
        let stack = AppStack::from_yaml(FULL_STACK).unwrap();

        stack.save(&path).unwrap();
        assert_eq!(AppStack::load(&path).unwrap(), stack);
    }

    #[test]
    fn discover_prefers_yml() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(APPSTACK_FILENAME), "apps:\n  - name: yml\n").unwrap();
        fs::write(dir.path().join(APPSTACK_FILENAME_ALT), "apps:\n  - name: yaml\n").unwrap();

        let stack = AppStack::discover(dir.path()).unwrap();
        assert_eq!(stack.apps[0].name, "yml");
    }

    #[test]
    fn discover_falls_back_to_yaml() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(APPSTACK_FILENAME_ALT), "apps:\n  - name: yaml\n").unwrap();

        let stack = AppStack::discover(dir.path()).unwrap();
        assert_eq!(stack.apps[0].name, "yaml");
    }

    #[test]
    fn discover_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = AppStack::discover(dir.path());
        assert!(matches!(result, Err(Error::AppstackNotFound(_))));
    }
}

mod equality {
    use super::*;

    #[test]
    fn equal_stacks() {
        let a = AppStack::from_yaml(FULL_STACK).unwrap();
        let b = AppStack::from_yaml(FULL_STACK).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn app_order_matters() {
        let a = AppStack::new(vec![app("x"), app("y")]).unwrap();
        let b = AppStack::new(vec![app("y"), app("x")]).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn properties_matter() {
        let a = AppStack::new(vec![app("x").with_property("memory", "1G")]).unwrap();
        let b = AppStack::new(vec![app("x").with_property("memory", "2G")]).unwrap();
        assert_ne!(a, b);
    }
}
