use std::{future::Future, pin::Pin, sync::Arc};

use crate::events::{EventHandler, EventProducer, Handler, LoanCompletedEvent, MatchFinishedEvent};

#[derive(Default, Clone)]
pub struct EventProducers {
    pub match_finished_producer: Vec<EventProducer<MatchFinishedEvent>>,
    pub loan_completed_producer: Vec<EventProducer<LoanCompletedEvent>>,
}

pub struct EventHandlers {
    pub on_match_finished: Option<EventHandler<MatchFinishedEvent>>,
    pub on_loan_completed: Option<EventHandler<LoanCompletedEvent>>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        let on_match_finished = hooks.on_match_finished.map(|f| EventHandler::new(buffer_size, f));
        let on_loan_completed = hooks.on_loan_completed.map(|f| EventHandler::new(buffer_size, f));
        Self { on_match_finished, on_loan_completed }
    }

    pub fn producers(&self) -> EventProducers {
        let mut result = EventProducers::default();
        if let Some(handler) = &self.on_match_finished {
            result.match_finished_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_loan_completed {
            result.loan_completed_producer.push(handler.subscribe());
        }
        result
    }

    /// Spawns a task for every registered handler. Each task ends once all of its producers have been dropped.
    pub async fn start_handlers(self) {
        if let Some(handler) = self.on_match_finished {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
        if let Some(handler) = self.on_loan_completed {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
    }
}

#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_match_finished: Option<Handler<MatchFinishedEvent>>,
    pub on_loan_completed: Option<Handler<LoanCompletedEvent>>,
}

impl EventHooks {
    pub fn on_match_finished<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(MatchFinishedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_match_finished = Some(Arc::new(f));
        self
    }

    pub fn on_loan_completed<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(LoanCompletedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_loan_completed = Some(Arc::new(f));
        self
    }
}
