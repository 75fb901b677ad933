use crate::app_env;
use anyhow::Context;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response};
use opentelemetry::trace::TracerProvider as _;
use opentelemetry::{KeyValue, global};
use opentelemetry_http::HeaderExtractor;
use opentelemetry_otlp::{MetricExporter, SpanExporter, WithExportConfig};
use opentelemetry_sdk::metrics::{PeriodicReader, SdkMeterProvider};
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::trace::{Tracer, TracerProvider};
use opentelemetry_sdk::{Resource, runtime};
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing::{Span, debug, field, info_span};
use tracing_opentelemetry::{MetricsLayer, OpenTelemetryLayer, OpenTelemetrySpanExt};
use tracing_subscriber::{EnvFilter, prelude::*, registry};

/// The name of the service as it should appear in OpenTelemetry collectors
const SERVICE_NAME: &str = "tasker-api";

/// Starts OTLP gRPC export of spans and metrics. Both run in the background on the tokio runtime.
fn otlp_pipeline(spans_url: &str, metrics_url: &str) -> Result<(Tracer, SdkMeterProvider), anyhow::Error> {
    let resource = Resource::new([KeyValue::new("service.name", SERVICE_NAME)]);

    let spans = SpanExporter::builder()
        .with_tonic()
        .with_endpoint(spans_url)
        .build()
        .context("building span exporter")?;
    let tracer = TracerProvider::builder()
        .with_batch_exporter(spans, runtime::Tokio)
        .with_resource(resource.clone())
        .build()
        .tracer(SERVICE_NAME);

    let metrics = MetricExporter::builder()
        .with_tonic()
        .with_endpoint(metrics_url)
        .build()
        .context("building metric exporter")?;
    let meter = SdkMeterProvider::builder()
        .with_reader(PeriodicReader::builder(metrics, runtime::Tokio).build())
        .with_resource(resource)
        .build();

    Ok((tracer, meter))
}

/// Installs the global subscriber. Stdout gets JSON lines filtered by [app_env::LOG_LEVEL]
/// ("info" when unset). When [otel_endpoints] holds span and metric URLs, everything at
/// "debug" and above is exported there as well.
pub fn init_telemetry(otel_endpoints: Option<&(String, String)>) -> Result<(), anyhow::Error> {
    let stdout_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .with_env_var(app_env::LOG_LEVEL)
        .from_env()
        .with_context(|| format!("{} holds an invalid filter", app_env::LOG_LEVEL))?;

    let (otel_spans, otel_metrics) = match otel_endpoints {
        Some((spans_url, metrics_url)) => {
            let (tracer, meter) = otlp_pipeline(spans_url, metrics_url)?;
            (Some(OpenTelemetryLayer::new(tracer)), Some(MetricsLayer::new(meter)))
        }
        None => (None, None),
    };

    global::set_text_map_propagator(TraceContextPropagator::new());
    registry()
        .with(LevelFilter::DEBUG)
        .with(otel_spans)
        .with(otel_metrics)
        .with(tracing_subscriber::fmt::layer().json().with_filter(stdout_filter))
        .try_init()
        .context("installing the global tracing subscriber")
}

/// Opens a span per request, parented to any W3C trace context the caller sent along
fn request_span(request: &Request<Body>) -> Span {
    let span = info_span!(
        "request",
        method = %request.method(),
        path = request.uri().path(),
        response_status = field::Empty,
    );
    span.set_parent(global::get_text_map_propagator(|propagator| {
        propagator.extract(&HeaderExtractor(request.headers()))
    }));
    span
}

fn record_status(response: &Response<Body>, latency: Duration, span: &Span) {
    span.record("response_status", field::display(response.status()));
    debug!(latency_ms = latency.as_millis() as u64, "finished processing request");
}

/// Wraps every route of [router] in a request span which records the final status
pub fn trace_requests<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(
        TraceLayer::new_for_http()
            .make_span_with(request_span)
            .on_response(record_status),
    )
}
