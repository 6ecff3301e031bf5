//! Chooses which artifact scores a request.

use serde::{Deserialize, Serialize};

use noshow_core::{Horizon, PredictionError};

use crate::artifact::Artifact;
use crate::bundle::ArtifactBundle;

/// Which artifact answered.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Legacy,
    SameDay,
    Future,
}

impl Route {
    pub fn as_str(&self) -> &'static str {
        match self {
            Route::Legacy => "legacy",
            Route::SameDay => "same_day",
            Route::Future => "future",
        }
    }
}

impl From<Horizon> for Route {
    fn from(h: Horizon) -> Self {
        match h {
            Horizon::SameDay => Route::SameDay,
            Horizon::Future => Route::Future,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Selected<'a> {
    pub route: Route,
    pub artifact: &'a Artifact,
}

/// Pick the artifact for `lead_days`.
///
/// Legacy bundles answer everything; otherwise `0` goes to the same-day
/// artifact and anything later to the future one. A horizon missing from the
/// bundle is reported as unavailable.
pub fn select(bundle: &ArtifactBundle, lead_days: u32) -> Result<Selected<'_>, PredictionError> {
    match bundle {
        ArtifactBundle::Legacy { artifact } => Ok(Selected {
            route: Route::Legacy,
            artifact,
        }),
        ArtifactBundle::DualHorizon {
            same_day, future, ..
        } => {
            let horizon = Horizon::from_lead_days(lead_days);
            let artifact = match horizon {
                Horizon::SameDay => same_day.as_ref(),
                Horizon::Future => future.as_ref(),
            };
            artifact
                .map(|artifact| Selected {
                    route: horizon.into(),
                    artifact,
                })
                .ok_or_else(|| {
                    PredictionError::unavailable(format!("loaded bundle has no {horizon} model"))
                })
        }
    }
}
