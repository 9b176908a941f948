mod common;

use common::{context, StubPlugin};
use lexibattle_plugin_host::*;
use lexibattle_types::QuestionTypeId;
use std::sync::atomic::Ordering;
use std::sync::Arc;

// ── Capabilities ─────────────────────────────────────────────────

#[test]
fn exactly_one_activation_hook_is_required() {
    assert_eq!(
        PluginCapabilities::with_init().activation_hook("p").unwrap(),
        ActivationHook::Init
    );
    assert_eq!(
        PluginCapabilities::with_load().and_destroy().activation_hook("p").unwrap(),
        ActivationHook::Load
    );

    let neither = PluginCapabilities::default().activation_hook("bare").unwrap_err();
    assert!(matches!(neither, PluginHostError::PluginShapeInvalid { .. }));
    assert!(neither.to_string().contains("neither init nor load"));

    let both = PluginCapabilities {
        init: true,
        load: true,
        destroy: false,
    };
    assert!(matches!(
        both.activation_hook("greedy"),
        Err(PluginHostError::PluginShapeInvalid { .. })
    ));
}

#[tokio::test]
async fn undeclared_hooks_report_capability_not_supported() {
    let plugin = StubPlugin::new("only-init", PluginCapabilities::with_init());
    let err = plugin.load(Default::default()).await.unwrap_err();
    assert!(matches!(err, PluginHostError::CapabilityNotSupported { ref capability, .. } if capability == "load"));
}

// ── Instantiation ────────────────────────────────────────────────

#[test]
fn constructible_module_builds_fresh_instances() {
    let module = PluginModule::constructible(|ctx: PluginContext| {
        assert_eq!(ctx.container_id, "question-container");
        assert_eq!(ctx.config["choices"], 4);
        Ok(Arc::new(StubPlugin::with_pool(
            "mc",
            PluginCapabilities::with_init(),
            &ctx.vocab_pool,
        )))
    });
    let id = QuestionTypeId::from(2);

    let a = module.instantiate(&id, context(7)).unwrap();
    let b = module.instantiate(&id, context(7)).unwrap();

    assert_eq!(module.shape(), ModuleShape::Constructible);
    assert!(!Arc::ptr_eq(&a, &b));
    assert_eq!(a.name(), "mc");
}

#[test]
fn singleton_module_reuses_instance_and_injects_vocabulary() {
    let plugin = Arc::new(StubPlugin::new("article", PluginCapabilities::with_load()));
    let module = PluginModule::Singleton(plugin.clone());
    let id = QuestionTypeId::from(4);

    let a = module.instantiate(&id, context(3)).unwrap();
    assert_eq!(plugin.pool_len.load(Ordering::SeqCst), 3);
    let b = module.instantiate(&id, context(9)).unwrap();

    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(plugin.pool_len.load(Ordering::SeqCst), 9);
}

#[test]
fn factory_error_becomes_construction_failed() {
    let module = PluginModule::constructible(|_ctx: PluginContext| {
        Err(PluginHostError::ActivationFailed {
            plugin: "mc".into(),
            message: "no speech voices".into(),
        })
    });

    let err = module.instantiate(&QuestionTypeId::from(2), context(1)).err().unwrap();

    assert!(matches!(err, PluginHostError::ConstructionFailed { ref message, .. } if message.contains("no speech voices")));
}

#[test]
fn factory_panic_becomes_construction_failed() {
    let module = PluginModule::constructible(|_ctx: PluginContext| -> PluginResult<Arc<dyn QuestionPlugin>> {
        panic!("template missing")
    });

    let err = module.instantiate(&QuestionTypeId::from(5), context(1)).err().unwrap();

    match err {
        PluginHostError::ConstructionFailed { type_id, message } => {
            assert_eq!(type_id, "5");
            assert!(message.contains("template missing"));
        }
        other => panic!("unexpected error: {other}"),
    }
}
