//! Shared test utilities used across shoal crates.

pub mod tracing {
    //! A capturing layer for asserting spans and events in tests.
    use std::{
        collections::HashMap,
        fmt,
        sync::{Arc, Mutex, PoisonError},
    };

    use tracing::{
        Event, Level, Subscriber,
        field::{Field, Visit},
        span::{Attributes, Id, Record},
    };
    use tracing_subscriber::{Layer, layer::Context, registry::LookupSpan};

    /// Captures closed spans and emitted events for later assertions.
    ///
    /// Clones share the same storage, so one clone can be installed in a
    /// subscriber while another is inspected.
    ///
    /// # Examples
    /// ```
    /// use shoal_test_support::tracing::RecordingLayer;
    /// use tracing_subscriber::layer::SubscriberExt;
    ///
    /// let layer = RecordingLayer::default();
    /// let subscriber = tracing_subscriber::registry().with(layer.clone());
    /// tracing::subscriber::with_default(subscriber, || {
    ///     let _span = tracing::info_span!("demo", answer = 42).entered();
    ///     tracing::warn!("careful");
    /// });
    /// assert_eq!(layer.span("demo").and_then(|span| span.field("answer").map(str::to_owned)), Some("42".to_owned()));
    /// assert!(layer.has_event(tracing::Level::WARN, "careful"));
    /// ```
    #[derive(Clone, Default)]
    pub struct RecordingLayer {
        log: Arc<Mutex<Log>>,
    }

    #[derive(Default)]
    struct Log {
        spans: Vec<SpanRecord>,
        events: Vec<EventRecord>,
    }

    impl RecordingLayer {
        /// Returns the closed spans in completion order.
        #[must_use]
        pub fn spans(&self) -> Vec<SpanRecord> {
            self.with_log(|log| log.spans.clone())
        }

        /// Returns the emitted events in emission order.
        #[must_use]
        pub fn events(&self) -> Vec<EventRecord> {
            self.with_log(|log| log.events.clone())
        }

        /// Returns the first closed span called `name`.
        #[must_use]
        pub fn span(&self, name: &str) -> Option<SpanRecord> {
            self.with_log(|log| log.spans.iter().find(|span| span.name == name).cloned())
        }

        /// Returns whether an event at `level` carried `message`.
        #[must_use]
        pub fn has_event(&self, level: Level, message: &str) -> bool {
            self.with_log(|log| {
                log.events
                    .iter()
                    .any(|event| event.level == level && event.message() == Some(message))
            })
        }

        fn with_log<T>(&self, read: impl FnOnce(&Log) -> T) -> T {
            let log = self.log.lock().unwrap_or_else(PoisonError::into_inner);
            read(&log)
        }

        fn push_span(&self, record: SpanRecord) {
            let mut log = self.log.lock().unwrap_or_else(PoisonError::into_inner);
            log.spans.push(record);
        }

        fn push_event(&self, record: EventRecord) {
            let mut log = self.log.lock().unwrap_or_else(PoisonError::into_inner);
            log.events.push(record);
        }
    }

    /// A closed span with its recorded fields.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct SpanRecord {
        /// Span name from the tracing metadata.
        pub name: String,
        /// Fields recorded at creation or later.
        pub fields: HashMap<String, String>,
    }

    impl SpanRecord {
        /// Returns the rendered value of field `name`.
        #[must_use]
        pub fn field(&self, name: &str) -> Option<&str> {
            self.fields.get(name).map(String::as_str)
        }
    }

    /// An emitted event with its level, target and fields.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct EventRecord {
        /// Event level.
        pub level: Level,
        /// Event target, usually the emitting module path.
        pub target: String,
        /// Fields attached to the event, `message` included.
        pub fields: HashMap<String, String>,
    }

    impl EventRecord {
        /// Returns the rendered value of field `name`.
        #[must_use]
        pub fn field(&self, name: &str) -> Option<&str> {
            self.fields.get(name).map(String::as_str)
        }

        /// Returns the event message.
        #[must_use]
        pub fn message(&self) -> Option<&str> {
            self.field("message")
        }
    }

    /// Fields gathered for a span that is still open.
    struct OpenSpan(SpanRecord);

    impl<S> Layer<S> for RecordingLayer
    where
        S: Subscriber + for<'span> LookupSpan<'span>,
    {
        fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
            let Some(span) = ctx.span(id) else {
                return;
            };
            let mut fields = HashMap::new();
            attrs.record(&mut FieldWriter(&mut fields));
            span.extensions_mut().insert(OpenSpan(SpanRecord {
                name: attrs.metadata().name().to_owned(),
                fields,
            }));
        }

        fn on_record(&self, id: &Id, values: &Record<'_>, ctx: Context<'_, S>) {
            let Some(span) = ctx.span(id) else {
                return;
            };
            if let Some(open) = span.extensions_mut().get_mut::<OpenSpan>() {
                values.record(&mut FieldWriter(&mut open.0.fields));
            }
        }

        fn on_close(&self, id: Id, ctx: Context<'_, S>) {
            let Some(span) = ctx.span(&id) else {
                return;
            };
            if let Some(open) = span.extensions_mut().remove::<OpenSpan>() {
                self.push_span(open.0);
            }
        }

        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let mut fields = HashMap::new();
            event.record(&mut FieldWriter(&mut fields));
            let metadata = event.metadata();
            self.push_event(EventRecord {
                level: *metadata.level(),
                target: metadata.target().to_owned(),
                fields,
            });
        }
    }

    /// Renders every visited field into a string map.
    struct FieldWriter<'a>(&'a mut HashMap<String, String>);

    impl FieldWriter<'_> {
        fn put(&mut self, field: &Field, value: String) {
            self.0.insert(field.name().to_owned(), value);
        }
    }

    impl Visit for FieldWriter<'_> {
        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            self.put(field, format!("{value:?}"));
        }

        fn record_str(&mut self, field: &Field, value: &str) {
            self.put(field, value.to_owned());
        }

        fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
            self.put(field, value.to_string());
        }

        fn record_bool(&mut self, field: &Field, value: bool) {
            self.put(field, value.to_string());
        }

        fn record_i64(&mut self, field: &Field, value: i64) {
            self.put(field, value.to_string());
        }

        fn record_u64(&mut self, field: &Field, value: u64) {
            self.put(field, value.to_string());
        }

        fn record_f64(&mut self, field: &Field, value: f64) {
            self.put(field, value.to_string());
        }
    }
}

pub mod ci {
    //! Environment-driven settings shared by CI and local test runs.

    pub mod property_test_profile;
}
