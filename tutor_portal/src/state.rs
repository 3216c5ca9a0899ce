use std::sync::Arc;

use common::gateway::{Latency, PaymentGateway};
use common::{Fixtures, Session};

pub struct AppState {
    pub fixtures: Fixtures,
    pub session: Session,
    pub gateway: Arc<dyn PaymentGateway>,
    latency: Latency,
}

impl AppState {
    pub fn new(fixtures: Fixtures, gateway: Arc<dyn PaymentGateway>, latency: Latency) -> Self {
        let session = Session::open(fixtures.session_user.clone());
        log::info!(
            "Session opened for {} ({:?})",
            session.user.name,
            session.user.role
        );
        AppState {
            fixtures,
            session,
            gateway,
            latency,
        }
    }

    /// Artificial response delay applied by the mock endpoints.
    pub async fn pause(&self) {
        self.latency.pause().await;
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use common::gateway::{SimulatedGateway, SimulationRates};

    /// Embedded fixtures, no delay, and fixed gateway outcomes.
    pub fn state(verification_rate: f64, payment_rate: f64) -> AppState {
        let fixtures = Fixtures::embedded().unwrap();
        let gateway = SimulatedGateway::new(
            fixtures.session_user.vpa.clone(),
            SimulationRates::new(verification_rate, payment_rate).unwrap(),
            Latency::none(),
        );
        AppState::new(fixtures, Arc::new(gateway), Latency::none())
    }

    /// Like [`state`], but every endpoint waits exactly `millis`.
    pub fn delayed(millis: u64) -> AppState {
        let AppState {
            fixtures,
            gateway,
            ..
        } = state(1.0, 1.0);
        AppState::new(fixtures, gateway, Latency::from_millis(millis, millis).unwrap())
    }
}
