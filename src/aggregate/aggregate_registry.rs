use std::sync::Arc;

use once_cell::sync::Lazy;
use tracing::debug;

use crate::{
    aggregate::{
        functions::register_builtin_aggregates, AggregateDispatcher, AggregateError,
        AggregateFactory, AggregateOperator, AggregationStep, FunctionCatalog, FunctionSignature,
        LegacyAggregateFactory, LegacyAggregateRegistry, RegistryConfig,
    },
    types::DataType,
};

static GLOBAL: Lazy<Arc<AggregateRegistry>> = Lazy::new(|| Arc::new(AggregateRegistry::with_builtins()));

/// Entry point for planners and executors: register aggregate functions,
/// list their signatures, and build operators.
///
/// Cheap to share behind an `Arc`. All methods take `&self`; both catalogs
/// guard their own state, so registration may race with lookups.
pub struct AggregateRegistry {
    config: RegistryConfig,
    catalog: Arc<FunctionCatalog>,
    legacy: Arc<LegacyAggregateRegistry>,
    dispatcher: AggregateDispatcher,
}

impl Default for AggregateRegistry {
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}

impl AggregateRegistry {
    pub fn new(config: RegistryConfig) -> Self {
        let catalog = Arc::new(FunctionCatalog::new(config.case_sensitive));
        let legacy = Arc::new(LegacyAggregateRegistry::new(config.case_sensitive));

        let mut dispatcher = AggregateDispatcher::new().with_resolver(catalog.clone());
        if config.legacy_fallback {
            dispatcher.push(legacy.clone());
        }
        if config.register_builtins {
            register_builtin_aggregates(&catalog);
        }
        debug!(
            case_sensitive = config.case_sensitive,
            legacy_fallback = config.legacy_fallback,
            functions = catalog.len(),
            "aggregate registry ready"
        );

        Self { config, catalog, legacy, dispatcher }
    }

    /// Default config: case-insensitive, legacy fallback on, built-ins loaded.
    pub fn with_builtins() -> Self {
        Self::default()
    }

    /// Process-wide instance for callers without a registry of their own.
    pub fn global() -> Arc<AggregateRegistry> {
        Arc::clone(&GLOBAL)
    }

    pub fn into_shared(self) -> Arc<AggregateRegistry> {
        Arc::new(self)
    }

    pub fn config(&self) -> &RegistryConfig { &self.config }
    pub fn catalog(&self) -> &Arc<FunctionCatalog> { &self.catalog }
    pub fn legacy(&self) -> &Arc<LegacyAggregateRegistry> { &self.legacy }

    /// Insert or replace `name`. Always `true`.
    pub fn register_aggregate_function<F: AggregateFactory + 'static>(
        &self,
        name: &str,
        signatures: Vec<FunctionSignature>,
        factory: F,
    ) -> bool {
        self.catalog.register(name, signatures, factory)
    }

    pub fn register_legacy_aggregate<F: LegacyAggregateFactory + 'static>(&self, name: &str, factory: F) {
        self.legacy.register(name, factory);
    }

    /// Declared overloads of `name`. The legacy registry has none.
    pub fn aggregate_function_signatures(&self, name: &str) -> Option<Vec<FunctionSignature>> {
        self.catalog.signatures(name)
    }

    /// Build a new operator for `name` at `step`.
    pub fn create(
        &self,
        name: &str,
        step: AggregationStep,
        arg_types: &[DataType],
        result_type: &DataType,
    ) -> Result<AggregateOperator, AggregateError> {
        self.dispatcher.create(name, step, arg_types, result_type)
    }

    /// Names known to either registry, sorted and deduplicated.
    pub fn list(&self) -> Vec<String> {
        let mut v = self.catalog.names();
        if self.config.legacy_fallback {
            v.extend(self.legacy.names());
        }
        v.sort();
        v.dedup();
        v
    }
}

/// Register into [`AggregateRegistry::global`].
pub fn register_aggregate_function<F: AggregateFactory + 'static>(
    name: &str,
    signatures: Vec<FunctionSignature>,
    factory: F,
) -> bool {
    GLOBAL.register_aggregate_function(name, signatures, factory)
}

/// Signatures known to [`AggregateRegistry::global`].
pub fn aggregate_function_signatures(name: &str) -> Option<Vec<FunctionSignature>> {
    GLOBAL.aggregate_function_signatures(name)
}

/// Build an operator from [`AggregateRegistry::global`].
pub fn create_aggregate(
    name: &str,
    step: AggregationStep,
    arg_types: &[DataType],
    result_type: &DataType,
) -> Result<AggregateOperator, AggregateError> {
    GLOBAL.create(name, step, arg_types, result_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{atomic::{AtomicUsize, Ordering}, Mutex};
    use serde_json::{json, Value};
    use crate::aggregate::{aggregate_factory, legacy_factory, Accumulator, AvgImpl};

    struct Tag(&'static str);
    impl Accumulator for Tag {
        fn update(&mut self, _args: &[Value]) -> Result<(), AggregateError> { Ok(()) }
        fn merge(&mut self, _partial: &Value) -> Result<(), AggregateError> { Ok(()) }
        fn partial(&self) -> Value { json!(self.0) }
        fn finalize(&self) -> Value { json!(self.0) }
    }

    type Seen = (AggregationStep, Vec<DataType>, DataType);

    fn bare() -> AggregateRegistry {
        AggregateRegistry::new(RegistryConfig::new().register_builtins(false))
    }

    fn sig() -> FunctionSignature {
        FunctionSignature::builder().argument(DataType::BigInt).return_type(DataType::BigInt).build()
    }

    #[test]
    fn create_invokes_registered_factory_with_exact_arguments() {
        let r = bare();
        let seen: Arc<Mutex<Vec<Seen>>> = Arc::default();
        let sink = seen.clone();
        r.register_aggregate_function("foo", vec![sig()], aggregate_factory(move |step, args, result| {
            sink.lock().unwrap().push((step, args.to_vec(), result.clone()));
            Ok(AggregateOperator::new("foo-op", step, args, result, Box::new(Tag("foo"))))
        }));

        let args = [DataType::BigInt, DataType::Varchar];
        let op = r.create("foo", AggregationStep::Intermediate, &args, &DataType::Double).unwrap();

        assert_eq!(op.name(), "foo-op");
        assert_eq!(op.step(), AggregationStep::Intermediate);
        assert_eq!(op.extract(), json!("foo"));
        assert_eq!(
            *seen.lock().unwrap(),
            vec![(AggregationStep::Intermediate, args.to_vec(), DataType::Double)]
        );
    }

    #[test]
    fn last_registration_wins() {
        let r = bare();
        let first_calls = Arc::new(AtomicUsize::new(0));
        let counter = first_calls.clone();
        r.register_aggregate_function("foo", vec![sig()], aggregate_factory(move |step, args, result| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(AggregateOperator::new("foo", step, args, result, Box::new(Tag("first"))))
        }));
        assert!(r.register_aggregate_function("foo", vec![], aggregate_factory(|step, args, result| {
            Ok(AggregateOperator::new("foo", step, args, result, Box::new(Tag("second"))))
        })));

        for step in AggregationStep::ALL {
            let op = r.create("foo", step, &[DataType::BigInt], &DataType::BigInt).unwrap();
            assert_eq!(op.extract(), json!("second"));
        }
        assert_eq!(first_calls.load(Ordering::SeqCst), 0);
        assert_eq!(r.aggregate_function_signatures("foo"), Some(vec![]));
    }

    #[test]
    fn unknown_name_fails_with_name_in_message() {
        let r = AggregateRegistry::with_builtins();
        let err = r.create("nonexistent", AggregationStep::Single, &[DataType::BigInt], &DataType::BigInt)
            .unwrap_err();
        assert_eq!(err, AggregateError::NotRegistered("nonexistent".into()));
        assert!(err.to_string().contains("nonexistent"));
    }

    #[test]
    fn signatures_are_returned_as_registered() {
        let r = bare();
        let sigs = vec![
            sig(),
            FunctionSignature::builder().argument(DataType::Double).return_type(DataType::Double).build(),
        ];
        r.register_aggregate_function("foo", sigs.clone(), aggregate_factory(|step, args, result| {
            Ok(AggregateOperator::new("foo", step, args, result, Box::new(Tag("x"))))
        }));
        assert_eq!(r.aggregate_function_signatures("foo"), Some(sigs));
        assert_eq!(r.aggregate_function_signatures("nope"), None);
    }

    #[test]
    fn legacy_only_name_is_served_by_legacy() {
        let r = bare();
        r.register_legacy_aggregate("bar", legacy_factory(|step, args, result| {
            Some(AggregateOperator::new("bar", step, args, result, Box::new(Tag("legacy"))))
        }));

        let op = r.create("bar", AggregationStep::Final, &[DataType::BigInt], &DataType::BigInt).unwrap();
        assert_eq!(op.extract(), json!("legacy"));
        assert!(!r.catalog().contains("bar"));
        // signatures are a catalog feature only
        assert_eq!(r.aggregate_function_signatures("bar"), None);
        assert_eq!(r.list(), vec!["bar"]);
    }

    #[test]
    fn catalog_shadows_legacy_for_the_same_name() {
        let r = bare();
        let legacy_calls = Arc::new(AtomicUsize::new(0));
        let counter = legacy_calls.clone();
        r.register_legacy_aggregate("dup", legacy_factory(move |step, args, result| {
            counter.fetch_add(1, Ordering::SeqCst);
            Some(AggregateOperator::new("dup", step, args, result, Box::new(Tag("legacy"))))
        }));
        r.register_aggregate_function("dup", vec![], aggregate_factory(|step, args, result| {
            Ok(AggregateOperator::new("dup", step, args, result, Box::new(Tag("new"))))
        }));

        let op = r.create("dup", AggregationStep::Single, &[], &DataType::BigInt).unwrap();
        assert_eq!(op.extract(), json!("new"));
        assert_eq!(legacy_calls.load(Ordering::SeqCst), 0);
        assert_eq!(r.list(), vec!["dup"]);
    }

    #[test]
    fn legacy_miss_collapses_into_not_registered() {
        let r = bare();
        r.register_legacy_aggregate("bar", legacy_factory(|_, _, _| None));
        let err = r.create("bar", AggregationStep::Single, &[], &DataType::BigInt).unwrap_err();
        assert_eq!(err, AggregateError::NotRegistered("bar".into()));
    }

    #[test]
    fn factory_errors_are_not_translated() {
        let r = AggregateRegistry::with_builtins();
        let err = r.create("avg", AggregationStep::Single, &[DataType::Varchar], &DataType::Double).unwrap_err();
        assert!(matches!(err, AggregateError::UnsupportedSignature { ref name, .. } if name == "avg"));
    }

    #[test]
    fn legacy_fallback_can_be_disabled() {
        let r = AggregateRegistry::new(RegistryConfig::bare());
        r.register_legacy_aggregate("bar", legacy_factory(|step, args, result| {
            Some(AggregateOperator::new("bar", step, args, result, Box::new(Tag("legacy"))))
        }));
        assert!(matches!(
            r.create("bar", AggregationStep::Single, &[], &DataType::BigInt),
            Err(AggregateError::NotRegistered(_))
        ));
        assert!(r.list().is_empty());
    }

    #[test]
    fn names_are_case_insensitive_by_default() {
        let r = AggregateRegistry::with_builtins();
        let op = r.create("SUM", AggregationStep::Single, &[DataType::BigInt], &DataType::BigInt).unwrap();
        assert_eq!(op.name(), "sum");
        assert!(r.aggregate_function_signatures("Avg").is_some());

        let strict = AggregateRegistry::new(RegistryConfig::new().case_sensitive(true));
        assert!(strict.create("SUM", AggregationStep::Single, &[DataType::BigInt], &DataType::BigInt).is_err());
    }

    #[test]
    fn every_call_builds_a_fresh_operator() {
        let r = AggregateRegistry::with_builtins();
        let mut a = r.create("count", AggregationStep::Single, &[], &DataType::BigInt).unwrap();
        a.add_input(&[]).unwrap();
        let b = r.create("count", AggregationStep::Single, &[], &DataType::BigInt).unwrap();
        assert_eq!(a.extract(), json!(1));
        assert_eq!(b.extract(), json!(0));
    }

    #[test]
    fn global_registry_is_shared_and_preloaded() {
        let g = AggregateRegistry::global();
        assert!(Arc::ptr_eq(&g, &AggregateRegistry::global()));
        for name in ["avg", "count", "max", "min", "sum"] {
            assert!(g.catalog().contains(name), "{name}");
        }
        let op = g.create("avg", AggregationStep::Partial, &[DataType::BigInt], &AvgImpl::intermediate_type()).unwrap();
        assert_eq!(op.extract(), json!([0.0, 0]));

        assert!(register_aggregate_function("global_only_test_fn", vec![sig()], aggregate_factory(|step, args, result| {
            Ok(AggregateOperator::new("global_only_test_fn", step, args, result, Box::new(Tag("g"))))
        })));
        assert_eq!(aggregate_function_signatures("GLOBAL_ONLY_TEST_FN"), Some(vec![sig()]));
        let op = create_aggregate("global_only_test_fn", AggregationStep::Single, &[DataType::BigInt], &DataType::BigInt).unwrap();
        assert_eq!(op.extract(), json!("g"));
    }

    #[test]
    fn concurrent_registration_and_creation() {
        let r = AggregateRegistry::with_builtins().into_shared();
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let r = Arc::clone(&r);
                std::thread::spawn(move || {
                    let name = format!("f{i}");
                    r.register_aggregate_function(&name, vec![], aggregate_factory(|step, args, result| {
                        Ok(AggregateOperator::new("f", step, args, result, Box::new(Tag("f"))))
                    }));
                    for _ in 0..50 {
                        r.create("sum", AggregationStep::Single, &[DataType::BigInt], &DataType::BigInt).unwrap();
                        r.create(&name, AggregationStep::Final, &[], &DataType::BigInt).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(r.catalog().len(), 5 + 8);
    }
}
