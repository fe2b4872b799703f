//! 샘플링 + 텍스트 필터.
//!
//! 이벤트마다 두 단계로 판정합니다:
//! 1. 균등 난수가 샘플링 비율 안에 들어오는지 (먼저 평가)
//! 2. 필터가 설정되어 있으면 본문이 필터 문자열을 대소문자 무시로 포함하는지
//!
//! 두 확률은 곱으로 합성됩니다: 필터 적용 시 실제 통과율은 `fraction × P(match)`.

use firehose_core::PostEvent;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// `[0, 1)` 균등 난수 공급원.
///
/// 판정마다 새로 뽑아야 하며 캐시하면 안 됩니다.
pub trait SampleSource: Send {
    fn draw(&mut self) -> f64;
}

/// `rand` 기반 기본 난수 공급원.
#[derive(Debug, Clone)]
pub struct RandomSource<R = StdRng> {
    rng: R,
}

impl RandomSource<StdRng> {
    /// OS 엔트로피로 시드된 공급원.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// 고정 시드 공급원 (재현 가능한 실행용).
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl<R: Rng + Send> RandomSource<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl Default for RandomSource<StdRng> {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl<R: Rng + Send> SampleSource for RandomSource<R> {
    fn draw(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

/// 샘플링 비율과 텍스트 필터.
#[derive(Debug, Clone)]
pub struct MessageFilter {
    fraction: f64,
    filter_term: String,
}

impl MessageFilter {
    pub fn new(fraction: f64) -> Self {
        Self {
            fraction,
            filter_term: String::new(),
        }
    }

    pub fn fraction(&self) -> f64 {
        self.fraction
    }

    /// 다음 판정부터 적용됩니다.
    pub fn set_fraction(&mut self, fraction: f64) {
        self.fraction = fraction;
    }

    /// 소문자로 저장된 현재 필터.
    pub fn filter_term(&self) -> &str {
        &self.filter_term
    }

    /// 빈 문자열이면 필터를 끕니다.
    pub fn set_filter(&mut self, term: &str) {
        self.filter_term = term.to_lowercase();
    }

    /// 텍스트 필터가 활성 상태인지.
    pub fn is_active(&self) -> bool {
        !self.filter_term.is_empty()
    }

    /// 샘플링 한 번: `draw < fraction`이면 통과.
    ///
    /// 비율 1.0은 항상, 0.0은 절대 통과하지 않습니다.
    pub fn sample<S: SampleSource + ?Sized>(&self, source: &mut S) -> bool {
        source.draw() < self.fraction
    }

    /// 포함 판정 (샘플링 후 텍스트 매칭).
    pub fn should_include<S: SampleSource + ?Sized>(
        &self,
        event: &PostEvent,
        source: &mut S,
    ) -> bool {
        if !self.sample(source) {
            return false;
        }

        self.matches(event)
    }

    /// 텍스트 매칭만 평가합니다. 필터가 있는데 본문이 없으면 불일치.
    pub fn matches(&self, event: &PostEvent) -> bool {
        if !self.is_active() {
            return true;
        }

        event
            .text()
            .is_some_and(|text| text.to_lowercase().contains(&self.filter_term))
    }

    /// 포함 판정에서 떨어진 이벤트를 필터 없는 상태에서 그래도 전달할지 다시 뽑습니다.
    ///
    /// `should_include`와 독립된 두 번째 추첨입니다. 필터가 활성이면 항상 false.
    pub fn resample<S: SampleSource + ?Sized>(&self, source: &mut S) -> bool {
        !self.is_active() && self.sample(source)
    }
}
