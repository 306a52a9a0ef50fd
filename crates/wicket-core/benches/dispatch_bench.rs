//! # Dispatch Benchmarks
//!
//! Performance benchmarks for the wicket-core dispatch pipeline.
//!
//! Run with: `cargo bench -p wicket-core`

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use serde_json::{Value, json};
use std::hint::black_box;
use wicket_core::{
    InputSchema, Registry, RegistryBuilder, RequestContext, RequestMeta, Rule, Session,
};

/// Registry with N public echo procedures plus one protected procedure.
fn build_registry(size: usize) -> Registry {
    let mut builder = RegistryBuilder::new();
    for i in 0..size {
        builder = builder.public(&format!("echo.{i}"), None, |_, input| async move {
            Ok(input)
        });
    }
    builder
        .protected("profile", None, |ctx, _| async move {
            Ok(json!({"user_id": ctx.session.user_id}))
        })
        .build()
        .expect("registry")
}

fn authed_context() -> RequestContext {
    RequestContext::new(
        Some(Session::new("u1", "Alice", "alice@example.com")),
        RequestMeta::default(),
    )
}

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_public_dispatch(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().expect("runtime");
    let mut group = c.benchmark_group("public_dispatch");

    for size in [10, 100, 1000].iter() {
        let registry = build_registry(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let result = rt.block_on(registry.dispatch(
                    RequestContext::anonymous(),
                    "echo.0",
                    json!({"x": 1}),
                ));
                black_box(result)
            });
        });
    }
    group.finish();
}

fn bench_protected_dispatch(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().expect("runtime");
    let registry = build_registry(10);

    c.bench_function("protected_dispatch_authorized", |b| {
        b.iter(|| {
            let result =
                rt.block_on(registry.dispatch(authed_context(), "profile", Value::Null));
            black_box(result)
        });
    });

    c.bench_function("protected_dispatch_rejected", |b| {
        b.iter(|| {
            let result = rt.block_on(registry.dispatch(
                RequestContext::anonymous(),
                "profile",
                Value::Null,
            ));
            black_box(result)
        });
    });
}

fn bench_validation(c: &mut Criterion) {
    let schema = InputSchema::new()
        .required("name", [Rule::NonEmpty, Rule::MaxLen(256)])
        .optional("email", [Rule::Email])
        .deny_unknown();
    let input = json!({"name": "Alice", "email": "alice@example.com"});

    c.bench_function("schema_check", |b| {
        b.iter(|| black_box(schema.check(black_box(&input))));
    });
}

criterion_group!(
    benches,
    bench_public_dispatch,
    bench_protected_dispatch,
    bench_validation
);
criterion_main!(benches);
