use std::{future::Future, pin::Pin, sync::Arc};

use tokio::task::JoinSet;

use crate::events::{EventHandler, EventProducer, Handler, PaymentConfirmedEvent, ReconciliationFinishedEvent};

#[derive(Default, Clone)]
pub struct EventProducers {
    pub payment_confirmed_producer: Vec<EventProducer<PaymentConfirmedEvent>>,
    pub reconciliation_finished_producer: Vec<EventProducer<ReconciliationFinishedEvent>>,
}

impl EventProducers {
    pub async fn publish_payment_confirmed(&self, event: PaymentConfirmedEvent) {
        for producer in &self.payment_confirmed_producer {
            producer.publish_event(event.clone()).await;
        }
    }

    pub async fn publish_reconciliation_finished(&self, event: ReconciliationFinishedEvent) {
        for producer in &self.reconciliation_finished_producer {
            producer.publish_event(event.clone()).await;
        }
    }
}

pub struct EventHandlers {
    pub on_payment_confirmed: Option<EventHandler<PaymentConfirmedEvent>>,
    pub on_reconciliation_finished: Option<EventHandler<ReconciliationFinishedEvent>>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        let on_payment_confirmed = hooks.on_payment_confirmed.map(|f| EventHandler::new(buffer_size, f));
        let on_reconciliation_finished = hooks.on_reconciliation_finished.map(|f| EventHandler::new(buffer_size, f));
        Self { on_payment_confirmed, on_reconciliation_finished }
    }

    pub fn producers(&self) -> EventProducers {
        let mut result = EventProducers::default();
        if let Some(handler) = &self.on_payment_confirmed {
            result.payment_confirmed_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_reconciliation_finished {
            result.reconciliation_finished_producer.push(handler.subscribe());
        }
        result
    }

    /// Spawns a task for each registered handler. Each task ends once every producer for it has been dropped and its
    /// outstanding events are handled, so joining the returned set waits for all notifications to go out.
    pub fn start_handlers(self) -> JoinSet<()> {
        let mut tasks = JoinSet::new();
        if let Some(handler) = self.on_payment_confirmed {
            tasks.spawn(handler.start_handler());
        }
        if let Some(handler) = self.on_reconciliation_finished {
            tasks.spawn(handler.start_handler());
        }
        tasks
    }
}

#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_payment_confirmed: Option<Handler<PaymentConfirmedEvent>>,
    pub on_reconciliation_finished: Option<Handler<ReconciliationFinishedEvent>>,
}

impl EventHooks {
    pub fn on_payment_confirmed<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(PaymentConfirmedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_payment_confirmed = Some(Arc::new(f));
        self
    }

    pub fn on_reconciliation_finished<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(ReconciliationFinishedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_reconciliation_finished = Some(Arc::new(f));
        self
    }
}
