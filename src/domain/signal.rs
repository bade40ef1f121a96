//! Signal generation: indicator series to trading intent and crossover pulses.
//!
//! Three interchangeable strategies share the [`SignalGenerator`] capability:
//! - [`EmaCrossover`]: +1 while EMA(fast) > EMA(slow), -1 while below, else 0
//! - [`EmaRsi`]: the EMA trend confirmed by RSI above/below fixed levels
//! - [`MacdCrossover`]: pulses only on the bar the MACD line crosses its signal
//!
//! The crossover series is the first difference of the signal series. Index 0
//! has no predecessor and is always `None`; consumers treat `None` as no signal.

use crate::domain::indicator::streaming::{EmaState, RollingRsi};
use crate::domain::indicator::macd::{macd_series, DEFAULT_LONG, DEFAULT_SHORT, DEFAULT_SIGNAL};
use crate::domain::indicator::{calculate_ema, calculate_rsi, macd_lines, IndicatorSeries};
use crate::domain::ohlcv::{closes, PriceBar};

pub const DEFAULT_FAST_WINDOW: usize = 5;
pub const DEFAULT_SLOW_WINDOW: usize = 20;
pub const DEFAULT_RSI_PERIOD: usize = 10;
pub const DEFAULT_RSI_BUY_LEVEL: f64 = 55.0;
pub const DEFAULT_RSI_SELL_LEVEL: f64 = 45.0;
pub const DEFAULT_MACD_PULSE: i8 = 2;

/// Output of a signal generator, aligned 1:1 with the input bars.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalFrame {
    pub indicators: Vec<IndicatorSeries>,
    /// Discrete intent per bar; `None` for strategies without a resting state.
    pub signal: Option<Vec<i8>>,
    pub crossover: Vec<Option<i8>>,
}

impl SignalFrame {
    /// Bars carrying a non-zero crossover pulse.
    pub fn pulse_count(&self) -> usize {
        self.crossover
            .iter()
            .filter(|c| matches!(c, Some(v) if *v != 0))
            .count()
    }
}

pub trait SignalGenerator {
    /// Short identifier used in logs and output file names.
    fn name(&self) -> &'static str;

    fn generate(&self, bars: &[PriceBar]) -> SignalFrame;
}

/// signal[i] - signal[i-1], with nothing at index 0.
pub fn crossover_from_signal(signal: &[i8]) -> Vec<Option<i8>> {
    let mut crossover = Vec::with_capacity(signal.len());
    if !signal.is_empty() {
        crossover.push(None);
    }
    crossover.extend(signal.windows(2).map(|w| Some(w[1] - w[0])));
    crossover
}

/// +1 above, -1 below, 0 when equal.
pub fn trend_signal(fast: f64, slow: f64) -> i8 {
    if fast > slow {
        1
    } else if fast < slow {
        -1
    } else {
        0
    }
}

/// Trend confirmed by RSI. An undefined RSI never confirms.
pub fn confirmed_signal(fast: f64, slow: f64, rsi: Option<f64>, buy: f64, sell: f64) -> i8 {
    match rsi {
        Some(r) if fast > slow && r > buy => 1,
        Some(r) if fast < slow && r < sell => -1,
        _ => 0,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmaCrossover {
    pub fast_window: usize,
    pub slow_window: usize,
}

impl Default for EmaCrossover {
    fn default() -> Self {
        EmaCrossover {
            fast_window: DEFAULT_FAST_WINDOW,
            slow_window: DEFAULT_SLOW_WINDOW,
        }
    }
}

impl EmaCrossover {
    pub fn streaming(&self) -> StreamingEmaCrossover {
        StreamingEmaCrossover::new(self.fast_window, self.slow_window, None)
    }
}

impl SignalGenerator for EmaCrossover {
    fn name(&self) -> &'static str {
        "ema_crossover"
    }

    fn generate(&self, bars: &[PriceBar]) -> SignalFrame {
        let fast = calculate_ema(bars, self.fast_window);
        let slow = calculate_ema(bars, self.slow_window);

        let signal: Vec<i8> = (0..bars.len())
            .map(|i| match (fast.simple_at(i), slow.simple_at(i)) {
                (Some(f), Some(s)) => trend_signal(f, s),
                _ => 0,
            })
            .collect();
        let crossover = crossover_from_signal(&signal);

        SignalFrame {
            indicators: vec![fast, slow],
            signal: Some(signal),
            crossover,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmaRsi {
    pub fast_window: usize,
    pub slow_window: usize,
    pub rsi_period: usize,
    pub buy_level: f64,
    pub sell_level: f64,
}

impl Default for EmaRsi {
    fn default() -> Self {
        EmaRsi {
            fast_window: DEFAULT_FAST_WINDOW,
            slow_window: DEFAULT_SLOW_WINDOW,
            rsi_period: DEFAULT_RSI_PERIOD,
            buy_level: DEFAULT_RSI_BUY_LEVEL,
            sell_level: DEFAULT_RSI_SELL_LEVEL,
        }
    }
}

impl EmaRsi {
    pub fn streaming(&self) -> StreamingEmaCrossover {
        StreamingEmaCrossover::new(
            self.fast_window,
            self.slow_window,
            Some((self.rsi_period, self.buy_level, self.sell_level)),
        )
    }
}

impl SignalGenerator for EmaRsi {
    fn name(&self) -> &'static str {
        "ema_rsi"
    }

    fn generate(&self, bars: &[PriceBar]) -> SignalFrame {
        let fast = calculate_ema(bars, self.fast_window);
        let slow = calculate_ema(bars, self.slow_window);
        let rsi = calculate_rsi(bars, self.rsi_period);

        let signal: Vec<i8> = (0..bars.len())
            .map(|i| match (fast.simple_at(i), slow.simple_at(i)) {
                (Some(f), Some(s)) => {
                    confirmed_signal(f, s, rsi.simple_at(i), self.buy_level, self.sell_level)
                }
                _ => 0,
            })
            .collect();

        if !bars.is_empty() && signal.iter().all(|&s| s == 0) {
            tracing::warn!(
                bars = bars.len(),
                "no EMA+RSI signals generated; consider adjusting RSI levels or EMA windows"
            );
        }

        let crossover = crossover_from_signal(&signal);
        SignalFrame {
            indicators: vec![fast, slow, rsi],
            signal: Some(signal),
            crossover,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MacdCrossover {
    pub short: usize,
    pub long: usize,
    pub signal: usize,
    /// Magnitude of the emitted pulse. 2 reproduces the historical output,
    /// which the simulator's +1/-1 entry test never matches.
    pub pulse: i8,
}

impl Default for MacdCrossover {
    fn default() -> Self {
        MacdCrossover {
            short: DEFAULT_SHORT,
            long: DEFAULT_LONG,
            signal: DEFAULT_SIGNAL,
            pulse: DEFAULT_MACD_PULSE,
        }
    }
}

impl MacdCrossover {
    /// True when pulses cannot trigger the simulator's entry/exit test.
    pub fn is_inert(&self) -> bool {
        self.pulse != 1
    }
}

impl SignalGenerator for MacdCrossover {
    fn name(&self) -> &'static str {
        "macd"
    }

    fn generate(&self, bars: &[PriceBar]) -> SignalFrame {
        let macd = macd_lines(&closes(bars), self.short, self.long, self.signal);
        let series = macd_series(bars, &macd, self.short, self.long, self.signal);
        let lines: Vec<(f64, f64)> = macd.macd.into_iter().zip(macd.signal).collect();

        let mut crossover = Vec::with_capacity(lines.len());
        if !lines.is_empty() {
            crossover.push(None);
        }
        crossover.extend(lines.windows(2).map(|w| {
            let (prev_macd, prev_signal) = w[0];
            let (macd, signal) = w[1];
            if macd > signal && prev_macd <= prev_signal {
                Some(self.pulse)
            } else if macd < signal && prev_macd >= prev_signal {
                Some(-self.pulse)
            } else {
                Some(0)
            }
        }));

        if self.is_inert() {
            tracing::warn!(
                pulse = self.pulse,
                "MACD pulses of this magnitude never match the +1/-1 entry/exit test; \
                 set macd_pulse = 1 to let MACD crossovers trade"
            );
        }

        SignalFrame {
            indicators: vec![series],
            signal: None,
            crossover,
        }
    }
}

/// The closed set of strategies a caller can select.
#[derive(Debug, Clone, PartialEq)]
pub enum Strategy {
    EmaCrossover(EmaCrossover),
    EmaRsi(EmaRsi),
    Macd(MacdCrossover),
}

impl SignalGenerator for Strategy {
    fn name(&self) -> &'static str {
        match self {
            Strategy::EmaCrossover(s) => s.name(),
            Strategy::EmaRsi(s) => s.name(),
            Strategy::Macd(s) => s.name(),
        }
    }

    fn generate(&self, bars: &[PriceBar]) -> SignalFrame {
        match self {
            Strategy::EmaCrossover(s) => s.generate(bars),
            Strategy::EmaRsi(s) => s.generate(bars),
            Strategy::Macd(s) => s.generate(bars),
        }
    }
}

/// One tick of a streaming EMA strategy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalTick {
    pub signal: i8,
    pub crossover: Option<i8>,
}

/// Tick-by-tick EMA (optionally RSI-confirmed) signal, holding only the
/// recursive EMA state and a bounded RSI window.
#[derive(Debug, Clone)]
pub struct StreamingEmaCrossover {
    fast: EmaState,
    slow: EmaState,
    rsi: Option<(RollingRsi, f64, f64)>,
    prev_signal: Option<i8>,
}

impl StreamingEmaCrossover {
    fn new(fast_window: usize, slow_window: usize, rsi: Option<(usize, f64, f64)>) -> Self {
        Self {
            fast: EmaState::new(fast_window),
            slow: EmaState::new(slow_window),
            rsi: rsi.map(|(period, buy, sell)| (RollingRsi::new(period), buy, sell)),
            prev_signal: None,
        }
    }

    pub fn update(&mut self, close: f64) -> SignalTick {
        let fast = self.fast.update(close);
        let slow = self.slow.update(close);
        let signal = match self.rsi.as_mut() {
            Some((rsi, buy, sell)) => {
                let value = rsi.update(close);
                confirmed_signal(fast, slow, value, *buy, *sell)
            }
            None => trend_signal(fast, slow),
        };

        let crossover = self.prev_signal.map(|prev| signal - prev);
        self.prev_signal = Some(signal);
        SignalTick { signal, crossover }
    }
}
