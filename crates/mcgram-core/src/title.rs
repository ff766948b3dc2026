//! Chat title composition from a presence sample.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::types::PresenceSample;

/// Suffix used when no source reports a number.
pub const ASLEEP_MARKER: &str = "(zzZ)";

/// Plain suffix used when every reachable server is empty.
pub const IDLE_MARKER: &str = "(nobody online)";

/// Whimsical alternatives to [`IDLE_MARKER`].
pub const IDLE_KAOMOJI: [&str; 4] = ["(。_。)", "(。﹏。)", "(；▽；)", "(´•̥ ̯ •̥`)"];

/// Chance of using a kaomoji instead of [`IDLE_MARKER`].
pub const KAOMOJI_PROBABILITY: f64 = 0.4;

/// Which kind of suffix a title carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleVariant {
    Asleep,
    Idle,
    Counts,
}

/// Classify a sample into the title variant it should produce.
pub fn title_variant(sample: &PresenceSample) -> TitleVariant {
    if sample.all_sentinel() {
        TitleVariant::Asleep
    } else if sample.total() == 0 {
        TitleVariant::Idle
    } else {
        TitleVariant::Counts
    }
}

/// Pick the idle suffix: a shuffled kaomoji with probability
/// [`KAOMOJI_PROBABILITY`], otherwise [`IDLE_MARKER`].
pub fn pick_idle_marker<R: Rng>(rng: &mut R) -> &'static str {
    if rng.gen_bool(KAOMOJI_PROBABILITY) {
        let mut set = IDLE_KAOMOJI;
        set.shuffle(rng);
        set[0]
    } else {
        IDLE_MARKER
    }
}

/// Build the display name for `sample`.
///
/// - all sentinels: `"{base} (zzZ)"`
/// - zero players: `"{base} {idle marker}"`
/// - otherwise: `"{base} (n1, n2)"` in source order
pub fn compose_title<R: Rng>(base: &str, sample: &PresenceSample, rng: &mut R) -> String {
    let suffix = match title_variant(sample) {
        TitleVariant::Asleep => ASLEEP_MARKER.to_string(),
        TitleVariant::Idle => pick_idle_marker(rng).to_string(),
        TitleVariant::Counts => {
            let counts: Vec<String> = sample.iter().map(|(_, r)| r.to_string()).collect();
            format!("({})", counts.join(", "))
        }
    };
    format!("{base} {suffix}").trim().to_string()
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::types::{PresenceReading, PresenceSource};

    fn is_idle_title(base: &str, title: &str) -> bool {
        let Some(rest) = title.strip_prefix(base) else {
            return false;
        };
        let rest = rest.trim();
        rest == IDLE_MARKER || IDLE_KAOMOJI.contains(&rest)
    }

    fn local(reading: PresenceReading) -> PresenceSample {
        PresenceSample::new().with(PresenceSource::Local, reading)
    }

    #[test]
    fn asleep_title_when_all_sentinel() {
        let mut rng = StdRng::seed_from_u64(1);
        let sample = local(PresenceReading::Unreachable)
            .with(PresenceSource::Remote, PresenceReading::Asleep);
        assert_eq!(compose_title("Craft", &sample, &mut rng), "Craft (zzZ)");
    }

    #[test]
    fn counts_title_joins_in_source_order() {
        let mut rng = StdRng::seed_from_u64(1);
        let sample =
            local(PresenceReading::Count(3)).with(PresenceSource::Remote, PresenceReading::Count(0));
        assert_eq!(compose_title("Craft", &sample, &mut rng), "Craft (3, 0)");
    }

    #[test]
    fn counts_title_renders_sentinels_inline() {
        let mut rng = StdRng::seed_from_u64(1);
        let sample = local(PresenceReading::Unreachable)
            .with(PresenceSource::Remote, PresenceReading::Count(2));
        assert_eq!(compose_title("Craft", &sample, &mut rng), "Craft (--, 2)");
    }

    #[test]
    fn idle_title_uses_a_known_marker() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let title = compose_title("Craft", &local(PresenceReading::Count(0)), &mut rng);
            assert!(is_idle_title("Craft", &title), "unexpected title {title}");
        }
    }

    #[test]
    fn idle_marker_mixes_both_kinds() {
        let mut rng = StdRng::seed_from_u64(42);
        let picks: Vec<&str> = (0..200).map(|_| pick_idle_marker(&mut rng)).collect();
        let kaomoji = picks.iter().filter(|m| IDLE_KAOMOJI.contains(*m)).count();
        assert!(kaomoji > 0, "expected some kaomoji");
        assert!(kaomoji < picks.len(), "expected some plain markers");
    }

    #[test]
    fn empty_base_is_trimmed() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            compose_title("", &local(PresenceReading::Asleep), &mut rng),
            "(zzZ)"
        );
    }

    #[test]
    fn variant_classification() {
        assert_eq!(title_variant(&local(PresenceReading::Asleep)), TitleVariant::Asleep);
        assert_eq!(title_variant(&local(PresenceReading::Count(0))), TitleVariant::Idle);
        assert_eq!(title_variant(&local(PresenceReading::Count(5))), TitleVariant::Counts);
    }
}
