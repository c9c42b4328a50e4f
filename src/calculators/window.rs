use serde::{Deserialize, Serialize};

use crate::calculators::state::{CalculatorState, Snapshot, StateError};
use crate::calculators::Calculator;

/// Batch function applied to the current window contents.
pub type WindowFunction = Box<dyn Fn(&[f64]) -> f64>;

enum WindowSource {
    Calculator(Box<dyn Snapshot>),
    Function(WindowFunction),
}

impl std::fmt::Debug for WindowSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WindowSource::Calculator(_) => f.write_str("WindowSource::Calculator"),
            WindowSource::Function(_) => f.write_str("WindowSource::Function"),
        }
    }
}

/// Statistic over a bounded trailing window of observations.
///
/// Wraps either an inner calculator or a stateless batch function; the two
/// constructors make a source mandatory, so the "neither configured" case
/// cannot be expressed. With `window_size` unset the buffer never evicts.
///
/// In calculator mode, every `append` resets and replays the inner
/// calculator over the buffer. That costs O(window) per observation and is
/// intentional: it keeps statistics with no incremental update rule
/// (median, mode, quantiles) correct under eviction. In function mode the
/// function is applied to the buffer on every [`statistic`] call.
///
/// [`statistic`]: Calculator::statistic
#[derive(Debug)]
pub struct Window {
    source: WindowSource,
    window: Vec<f64>,
    window_size: Option<usize>,
    count: usize,
}

/// Plain state record for [`Window`].
///
/// `inner` is the wrapped calculator's state, or `None` for a
/// function-backed window, whose function must be re-attached on restore
/// via [`Window::from_state_with`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowState {
    pub count: usize,
    pub window: Vec<f64>,
    pub window_size: Option<usize>,
    pub inner: Option<Box<CalculatorState>>,
}

impl Window {
    /// Window over an inner calculator, replayed on every append.
    pub fn over(calculator: Box<dyn Snapshot>, window_size: Option<usize>) -> Self {
        Self {
            source: WindowSource::Calculator(calculator),
            window: Vec::new(),
            window_size,
            count: 0,
        }
    }

    /// Window over a batch function recomputed from scratch at read time.
    pub fn of_fn(function: impl Fn(&[f64]) -> f64 + 'static, window_size: Option<usize>) -> Self {
        Self {
            source: WindowSource::Function(Box::new(function)),
            window: Vec::new(),
            window_size,
            count: 0,
        }
    }

    /// The current window contents, oldest first.
    pub fn contents(&self) -> &[f64] {
        &self.window
    }

    pub fn window_size(&self) -> Option<usize> {
        self.window_size
    }

    pub fn state(&self) -> Option<WindowState> {
        let inner = match &self.source {
            WindowSource::Calculator(inner) => Some(Box::new(inner.capture()?)),
            WindowSource::Function(_) => None,
        };
        Some(WindowState {
            count: self.count,
            window: self.window.clone(),
            window_size: self.window_size,
            inner,
        })
    }

    /// Rebuilds a calculator-backed window from its state.
    pub fn from_state(state: WindowState) -> Result<Self, StateError> {
        let inner = state
            .inner
            .ok_or(StateError::WindowFunctionMissing)?
            .into_calculator()?;
        let mut window = Self::over(inner, state.window_size);
        window.restore_buffer(state.count, state.window);
        Ok(window)
    }

    /// Rebuilds a function-backed window from its state, re-attaching the
    /// batch function (closures are not part of the serialized state).
    pub fn from_state_with(
        state: WindowState,
        function: impl Fn(&[f64]) -> f64 + 'static,
    ) -> Self {
        let mut window = Self::of_fn(function, state.window_size);
        window.restore_buffer(state.count, state.window);
        window
    }

    fn restore_buffer(&mut self, count: usize, contents: Vec<f64>) {
        self.count = count;
        self.window = contents;
        if let WindowSource::Calculator(inner) = &mut self.source {
            inner.reset();
            inner.extend(&self.window);
        }
    }
}

impl Calculator for Window {
    type Input = f64;
    type Output = f64;

    fn append(&mut self, x: f64) {
        self.count += 1;
        self.window.push(x);
        if let Some(size) = self.window_size {
            while self.window.len() > size {
                self.window.remove(0);
            }
        }
        if let WindowSource::Calculator(inner) = &mut self.source {
            inner.reset();
            inner.extend(&self.window);
        }
    }

    fn statistic(&self) -> f64 {
        match &self.source {
            WindowSource::Calculator(inner) => inner.statistic(),
            WindowSource::Function(function) => function(&self.window),
        }
    }

    fn count(&self) -> usize {
        self.count
    }

    fn reset(&mut self) {
        self.count = 0;
        self.window.clear();
        if let WindowSource::Calculator(inner) = &mut self.source {
            inner.reset();
        }
    }
}

impl Snapshot for Window {
    fn capture(&self) -> Option<CalculatorState> {
        self.state().map(CalculatorState::Window)
    }
}
