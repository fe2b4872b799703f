//! 윈도우 통계와 단어 인덱스의 성질 테스트.

use firehose_stream::{WindowStatistics, WordAnalyzer};
use proptest::prelude::*;

/// 수신 순서대로 증가하는 타임스탬프와 크기.
fn arrivals() -> impl Strategy<Value = Vec<(i64, usize)>> {
    prop::collection::vec((0i64..2_000, 0usize..4_096), 0..200).prop_map(|steps| {
        let mut ts = 0;
        steps
            .into_iter()
            .map(|(gap, size)| {
                ts += gap;
                (ts, size)
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn window_count_matches_live_records(
        records in arrivals(),
        window_ms in 1_000i64..300_000,
        extra in 0i64..400_000,
    ) {
        let mut stats = WindowStatistics::new(window_ms);
        for &(ts, size) in &records {
            stats.record_message(ts, size, true);
        }

        let now = records.last().map(|r| r.0).unwrap_or(0) + extra;
        let counters = stats.calculate_stats(now, false);

        let live: Vec<&(i64, usize)> = records.iter().filter(|r| r.0 > now - window_ms).collect();
        prop_assert_eq!(counters.messages_per_window, live.len());
        prop_assert_eq!(counters.bytes_per_window, live.iter().map(|r| r.1).sum::<usize>());

        let last_second = live.iter().filter(|r| now - r.0 < 1_000).count();
        prop_assert_eq!(counters.messages_per_second, last_second);
    }

    #[test]
    fn window_count_never_grows_without_arrivals(
        records in arrivals(),
        window_ms in 1_000i64..120_000,
        steps in prop::collection::vec(0i64..10_000, 1..20),
    ) {
        let mut stats = WindowStatistics::new(window_ms);
        for &(ts, size) in &records {
            stats.record_message(ts, size, false);
        }

        let mut now = records.last().map(|r| r.0).unwrap_or(0);
        let mut previous = stats.calculate_stats(now, false).messages_per_window;
        for step in steps {
            now += step;
            let current = stats.calculate_stats(now, false).messages_per_window;
            prop_assert!(current <= previous);
            previous = current;
        }

        // 필터 시리즈에는 아무것도 기록되지 않았음
        prop_assert_eq!(stats.calculate_stats(now, true).messages_per_window, 0);
    }

    #[test]
    fn word_counts_are_per_post(repeats in 1usize..10, posts in 1usize..10) {
        let mut analyzer = WordAnalyzer::new();
        let text = vec!["octopus"; repeats].join(" ");
        for i in 0..posts {
            analyzer.update_word_frequencies(&text, i as i64);
        }

        let frequencies = analyzer.word_frequencies(posts as i64, 60_000);
        prop_assert_eq!(frequencies.get("octopus").copied(), Some(posts));
    }
}
