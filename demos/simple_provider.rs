use thinknode_provider::{
    CalcFailure, CalcRegistry, CalcValue, Capabilities, Provider, TypeDesc,
};

// A minimal provider. Expects THINKNODE_HOST, THINKNODE_PORT and
// THINKNODE_PID in the environment, as a supervisor would set them.
pub fn main() {
    flexi_logger::Logger::try_with_env_or_str("debug")
        .unwrap()
        .start()
        .unwrap_or_else(|e| panic!("Logger initialization failed with {e}"));

    let mut registry = CalcRegistry::new();
    registry
        .register(
            "Add",
            vec![TypeDesc::Integer, TypeDesc::Integer],
            TypeDesc::Integer,
            Capabilities::None,
            |args, _ctx| match (&args[0], &args[1]) {
                (CalcValue::Integer(a), CalcValue::Integer(b)) => Ok(CalcValue::Integer(a + b)),
                _ => Err(CalcFailure::new("BadArgs", "expected two integers")),
            },
        )
        .expect("registering Add");
    registry
        .register(
            "Sum",
            vec![TypeDesc::array_of(TypeDesc::Integer)],
            TypeDesc::Integer,
            Capabilities::Progress,
            |args, ctx| {
                let CalcValue::Array(items) = &args[0] else {
                    return Err(CalcFailure::new("BadArgs", "expected an array of integers"));
                };
                let mut sum = 0_i64;
                for (i, item) in items.iter().enumerate() {
                    if ctx.cancellation().is_cancelled() {
                        break;
                    }
                    if let CalcValue::Integer(v) = item {
                        sum += v;
                    }
                    if let Some(progress) = ctx.progress() {
                        let fraction = (i + 1) as f32 / items.len() as f32;
                        progress.report(fraction, "summing").ok();
                    }
                }
                Ok(CalcValue::Integer(sum))
            },
        )
        .expect("registering Sum");

    // start() returns only when the connection is gone
    if let Err(error) = Provider::new(registry).start() {
        log::error!("Provider terminated: {error}");
        std::process::exit(1);
    }
}
