use lazy_static::lazy_static;
use prometheus::{IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

lazy_static! {
    pub static ref DISPATCH: IntCounter =
        IntCounter::new("dispatch", "dispatch calls").unwrap();
    pub static ref DISPATCH_BYPASSED: IntCounter =
        IntCounter::new("dispatch_bypassed", "dispatch calls skipped in testing mode").unwrap();
    pub static ref TRIGGER: IntCounterVec =
        IntCounterVec::new(Opts::new("trigger", "fired triggers"), &["trigger"]).unwrap();
    pub static ref INVOCATION: IntCounterVec = IntCounterVec::new(
        Opts::new("invocation", "connector invocations by outcome"),
        &["connector", "outcome"]
    )
    .unwrap();
    pub static ref REGISTRY: Registry =
        Registry::new_custom(Some("stationhook".to_string()), None).unwrap();
    pub static ref ENCODER: TextEncoder = TextEncoder::new();
}

pub fn metrics_register() -> prometheus::Result<()> {
    REGISTRY.register(Box::new(DISPATCH.clone()))?;
    REGISTRY.register(Box::new(DISPATCH_BYPASSED.clone()))?;
    REGISTRY.register(Box::new(TRIGGER.clone()))?;
    REGISTRY.register(Box::new(INVOCATION.clone()))?;
    Ok(())
}

pub fn gather() -> prometheus::Result<String> {
    ENCODER.encode_to_string(&REGISTRY.gather())
}
