use crate::domain::{
    relaxation_oracle::{RelaxationOracle, Result, SolverError},
    value_objects::SolverBackend,
};
use crate::solver::MicroLpSolver;
use std::sync::Arc;

#[cfg(feature = "coin_cbc")]
use crate::solver::CoinCbcSolver;
#[cfg(feature = "highs")]
use crate::solver::HighsSolver;

/// Factory for creating oracle instances from configuration
pub struct SolverFactory;

impl SolverFactory {
    /// Create the oracle for a specific backend.
    ///
    /// Fails when the backend was not compiled into this build.
    pub fn create_from_backend(backend: SolverBackend) -> Result<Arc<dyn RelaxationOracle>> {
        match backend {
            SolverBackend::Auto => Ok(Self::default_solver()),
            SolverBackend::MicroLp => Ok(Arc::new(MicroLpSolver::new())),
            SolverBackend::CoinCbc => Self::coin_cbc(),
            SolverBackend::Highs => Self::highs(),
        }
    }

    /// HiGHS when compiled in, microlp otherwise
    pub fn default_solver() -> Arc<dyn RelaxationOracle> {
        #[cfg(feature = "highs")]
        {
            Arc::new(HighsSolver::new())
        }
        #[cfg(not(feature = "highs"))]
        {
            Arc::new(MicroLpSolver::new())
        }
    }

    #[cfg(feature = "coin_cbc")]
    fn coin_cbc() -> Result<Arc<dyn RelaxationOracle>> {
        Ok(Arc::new(CoinCbcSolver::new()))
    }

    #[cfg(not(feature = "coin_cbc"))]
    fn coin_cbc() -> Result<Arc<dyn RelaxationOracle>> {
        Err(SolverError::SolverNotAvailable(
            "COIN-OR CBC support not compiled in (enable the `coin_cbc` feature)".to_string(),
        ))
    }

    #[cfg(feature = "highs")]
    fn highs() -> Result<Arc<dyn RelaxationOracle>> {
        Ok(Arc::new(HighsSolver::new()))
    }

    #[cfg(not(feature = "highs"))]
    fn highs() -> Result<Arc<dyn RelaxationOracle>> {
        Err(SolverError::SolverNotAvailable(
            "HiGHS support not compiled in (enable the `highs` feature)".to_string(),
        ))
    }
}
