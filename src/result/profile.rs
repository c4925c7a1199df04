//! result::profile: profile paths and the profile result store.
//!
//! Purpose
//! -------
//! Hold the outcome of profiling: one [`ProfilerResult`] per profiled
//! parameter, grouped into profile lists inside a [`ProfileResultStore`].
//!
//! Key behaviors
//! -------------
//! - [`ProfilerResult`] keeps parallel per-step paths (parameter vectors,
//!   objective values, likelihood ratios, gradient norms, convergence
//!   flags, timings) plus the index of the starting optimum.
//! - Walking appends at the end of the path; [`ProfilerResult::flip_profile`]
//!   reverses every path so the same append can grow either end.
//! - [`ProfileResultStore`] creates lists on demand and overwrites single
//!   `(list, parameter)` slots in place.
//!
//! Invariants & assumptions
//! ------------------------
//! - All paths of a `ProfilerResult` have the same length, which is at
//!   least one.
//! - `optimum_index` always points at the starting optimum, also after
//!   flips; entries before it form the decreasing segment, entries after
//!   it the increasing one.
//! - Every profile list has length `dim_full`; `None` marks parameters that
//!   were not profiled.
use crate::{
    optimization::minimizer::types::Theta,
    profile::errors::{ProfilingError, ProfilingResult},
};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Walking direction along a profiled parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Decreasing,
    Increasing,
}

impl Direction {
    /// `-1.0` for [`Direction::Decreasing`], `1.0` for [`Direction::Increasing`].
    pub fn sign(self) -> f64 {
        match self {
            Direction::Decreasing => -1.0,
            Direction::Increasing => 1.0,
        }
    }
}

/// One point appended to a profile.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfilePoint {
    pub x: Theta,
    pub fval: f64,
    pub ratio: f64,
    pub gradnorm: f64,
    pub converged: bool,
    pub time: f64,
    pub n_fval: usize,
}

/// Profile of a single parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfilerResult {
    /// Full parameter vectors, one per step.
    pub x_path: Vec<Theta>,
    pub fval_path: Vec<f64>,
    /// `exp(global_opt - fval)` per step.
    pub ratio_path: Vec<f64>,
    /// NaN where the optimizer reported no gradient.
    pub gradnorm_path: Vec<f64>,
    pub converged_path: Vec<bool>,
    /// Seconds spent on each step.
    pub time_path: Vec<f64>,
    pub optimum_index: usize,
    /// Index of the profiled parameter.
    pub i_par: usize,
    pub n_fval: usize,
    pub time_total: f64,
    pub message: String,
}

impl ProfilerResult {
    /// Single-point profile at the starting optimum.
    pub fn new(i_par: usize, point: ProfilePoint) -> Self {
        Self {
            x_path: vec![point.x],
            fval_path: vec![point.fval],
            ratio_path: vec![point.ratio],
            gradnorm_path: vec![point.gradnorm],
            converged_path: vec![point.converged],
            time_path: vec![point.time],
            optimum_index: 0,
            i_par,
            n_fval: point.n_fval,
            time_total: point.time,
            message: String::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.x_path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x_path.is_empty()
    }

    /// Append a point at the end of every path.
    pub fn append_profile_point(&mut self, point: ProfilePoint) {
        self.x_path.push(point.x);
        self.fval_path.push(point.fval);
        self.ratio_path.push(point.ratio);
        self.gradnorm_path.push(point.gradnorm);
        self.converged_path.push(point.converged);
        self.time_path.push(point.time);
        self.n_fval += point.n_fval;
        self.time_total += point.time;
    }

    /// Reverse every path, keeping `optimum_index` on the optimum.
    pub fn flip_profile(&mut self) {
        self.x_path.reverse();
        self.fval_path.reverse();
        self.ratio_path.reverse();
        self.gradnorm_path.reverse();
        self.converged_path.reverse();
        self.time_path.reverse();
        if !self.is_empty() {
            self.optimum_index = self.len() - 1 - self.optimum_index;
        }
    }

    /// `dim_full × n_steps` matrix, one column per step.
    pub fn x_path_matrix(&self) -> Array2<f64> {
        let dim = self.x_path.first().map_or(0, |x| x.len());
        Array2::from_shape_fn((dim, self.len()), |(r, c)| self.x_path[c][r])
    }

    /// Values of the profiled parameter along the path.
    pub fn par_values(&self) -> Vec<f64> {
        self.x_path.iter().map(|x| x[self.i_par]).collect()
    }

    /// Steps taken while decreasing the parameter (before the optimum).
    pub fn decreasing_range(&self) -> Range<usize> {
        0..self.optimum_index
    }

    /// Steps taken while increasing the parameter (after the optimum).
    pub fn increasing_range(&self) -> Range<usize> {
        (self.optimum_index + 1).min(self.len())..self.len()
    }

    /// Last point of the path.
    pub fn last_x(&self) -> Option<&Theta> {
        self.x_path.last()
    }
}

/// Ordered collection of profile lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileResultStore {
    pub list: Vec<Vec<Option<ProfilerResult>>>,
}

impl ProfileResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of profile lists.
    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn last_list_index(&self) -> Option<usize> {
        self.list.len().checked_sub(1)
    }

    /// Append a list of `dim_full` empty slots and return its index.
    pub fn append_empty_profile_list(&mut self, dim_full: usize) -> usize {
        self.list.push(vec![None; dim_full]);
        self.list.len() - 1
    }

    pub fn profile_list(&self, list_index: usize) -> ProfilingResult<&[Option<ProfilerResult>]> {
        self.list
            .get(list_index)
            .map(Vec::as_slice)
            .ok_or(ProfilingError::InvalidProfileList { index: list_index, len: self.list.len() })
    }

    /// Stored profile of `param_index` in list `list_index`, `None` when the
    /// slot is empty.
    ///
    /// # Errors
    /// - [`ProfilingError::InvalidProfileList`] / [`ProfilingError::ParameterIndexOutOfRange`].
    pub fn get_profiler_result(
        &self, param_index: usize, list_index: usize,
    ) -> ProfilingResult<Option<&ProfilerResult>> {
        let list = self.profile_list(list_index)?;
        list.get(param_index)
            .map(Option::as_ref)
            .ok_or(ProfilingError::ParameterIndexOutOfRange { index: param_index, dim: list.len() })
    }

    /// Overwrite one slot.
    pub fn set_profiler_result(
        &mut self, list_index: usize, param_index: usize, result: ProfilerResult,
    ) -> ProfilingResult<()> {
        let len = self.list.len();
        let list = self
            .list
            .get_mut(list_index)
            .ok_or(ProfilingError::InvalidProfileList { index: list_index, len })?;
        let dim = list.len();
        let slot = list
            .get_mut(param_index)
            .ok_or(ProfilingError::ParameterIndexOutOfRange { index: param_index, dim })?;
        *slot = Some(result);
        Ok(())
    }

    /// Append a complete profile list and return its index.
    ///
    /// # Errors
    /// - [`ProfilingError::DimensionMismatch`] if an existing list has a
    ///   different length.
    pub fn append_profiler_result(
        &mut self, profiles: Vec<Option<ProfilerResult>>,
    ) -> ProfilingResult<usize> {
        if let Some(first) = self.list.first() {
            if first.len() != profiles.len() {
                return Err(ProfilingError::DimensionMismatch {
                    expected: first.len(),
                    found: profiles.len(),
                });
            }
        }
        self.list.push(profiles);
        Ok(self.list.len() - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn point(x0: f64, fval: f64) -> ProfilePoint {
        ProfilePoint {
            x: array![x0, 10.0 * x0],
            fval,
            ratio: (-fval).exp(),
            gradnorm: 0.1,
            converged: true,
            time: 0.5,
            n_fval: 3,
        }
    }

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Appending and flipping profiles while tracking the optimum.
    // - Matrix view and segment ranges.
    // - Store slot management and index errors.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Walking down (flip, append, flip) keeps the optimum index correct and
    // the paths ascending.
    //
    // Given
    // -----
    // - A seed at x0 = 0, one point appended upwards (x0 = 1), then two
    //   points appended after a flip (x0 = -1, -2).
    //
    // Expect
    // ------
    // - Final `par_values == [-2, -1, 0, 1]`, `optimum_index == 2`.
    // - Counters accumulate over all four points.
    fn flip_and_append_track_optimum() {
        // Arrange
        let mut p = ProfilerResult::new(0, point(0.0, 0.0));

        // Act
        p.append_profile_point(point(1.0, 0.5));
        p.flip_profile();
        p.append_profile_point(point(-1.0, 0.5));
        p.append_profile_point(point(-2.0, 2.0));
        p.flip_profile();

        // Assert
        assert_eq!(p.par_values(), vec![-2.0, -1.0, 0.0, 1.0]);
        assert_eq!(p.optimum_index, 2);
        assert_eq!(p.fval_path[p.optimum_index], 0.0);
        assert_eq!(p.decreasing_range(), 0..2);
        assert_eq!(p.increasing_range(), 3..4);
        assert_eq!(p.n_fval, 12);
        assert!((p.time_total - 2.0).abs() < 1e-12);
        assert_eq!(p.ratio_path.len(), p.len());
    }

    #[test]
    // Purpose
    // -------
    // The matrix view has one column per step.
    //
    // Given
    // -----
    // - A two-point profile over a 2-parameter model.
    //
    // Expect
    // ------
    // - Shape `(2, 2)` and column `k` equal to `x_path[k]`.
    fn x_path_matrix_has_columns_per_step() {
        let mut p = ProfilerResult::new(1, point(0.0, 0.0));
        p.append_profile_point(point(0.5, 0.1));

        let m = p.x_path_matrix();

        assert_eq!(m.dim(), (2, 2));
        assert_eq!(m[[1, 1]], 5.0);
        assert_eq!(p.par_values(), vec![0.0, 5.0]);
    }

    #[test]
    // Purpose
    // -------
    // Store slots are created empty, overwritten in place, and guarded by
    // index checks.
    //
    // Given
    // -----
    // - Two lists of length 3; a profile written into `(1, 2)` twice.
    //
    // Expect
    // ------
    // - Only `(1, 2)` is populated, holding the second write.
    // - Out-of-range list and parameter indices are errors.
    fn store_overwrites_single_slot_and_checks_indices() {
        // Arrange
        let mut store = ProfileResultStore::new();
        assert_eq!(store.append_empty_profile_list(3), 0);
        assert_eq!(store.append_empty_profile_list(3), 1);
        let first = ProfilerResult::new(2, point(0.0, 0.0));
        let mut second = first.clone();
        second.append_profile_point(point(1.0, 1.0));

        // Act
        store.set_profiler_result(1, 2, first).expect("valid slot");
        store.set_profiler_result(1, 2, second.clone()).expect("valid slot");

        // Assert
        assert_eq!(store.get_profiler_result(2, 1).expect("valid slot"), Some(&second));
        assert_eq!(store.get_profiler_result(2, 0).expect("valid slot"), None);
        assert_eq!(store.last_list_index(), Some(1));
        assert_eq!(
            store.get_profiler_result(0, 5),
            Err(ProfilingError::InvalidProfileList { index: 5, len: 2 })
        );
        assert_eq!(
            store.set_profiler_result(0, 3, second),
            Err(ProfilingError::ParameterIndexOutOfRange { index: 3, dim: 3 })
        );
        assert_eq!(
            store.append_profiler_result(vec![None; 2]),
            Err(ProfilingError::DimensionMismatch { expected: 3, found: 2 })
        );
    }
}
