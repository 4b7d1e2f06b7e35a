//! Unit tests for fantasy scoring

use super::*;

#[cfg(test)]
mod scoring_tests {
    use super::*;

    #[test]
    fn test_skater_points_reference_line() {
        let line = SkaterStatLine {
            goals: 2,
            assists: 1,
            power_play_points: 1,
            shorthanded_points: 0,
            shots: 4,
            blocked_shots: 2,
            hits: 3,
        };

        assert_eq!(skater_points(&line, &SkaterWeights::default()), 7.2);
    }

    #[test]
    fn test_skater_points_empty_line_is_zero() {
        let points = skater_points(&SkaterStatLine::default(), &SkaterWeights::default());
        assert_eq!(points, 0.0);
    }

    #[test]
    fn test_skater_points_custom_weights() {
        let weights = SkaterWeights {
            goals: 3.0,
            hits: 0.0,
            ..SkaterWeights::default()
        };
        let line = SkaterStatLine {
            goals: 1,
            hits: 10,
            ..SkaterStatLine::default()
        };

        assert_eq!(skater_points(&line, &weights), 3.0);
    }

    #[test]
    fn test_goalie_points_win() {
        let line = GoalieStatLine {
            decision: Some(Decision::Win),
            goals_against: 2,
            saves: 28,
        };

        assert_eq!(goalie_points(&line, &GoalieWeights::default()), 5.6);
        assert_eq!(
            line.flags(),
            GoalieFlags {
                win: 1,
                ot_loss: 0,
                shutout: 0
            }
        );
    }

    #[test]
    fn test_goalie_shutout_requires_saves() {
        let did_not_play = GoalieStatLine {
            decision: None,
            goals_against: 0,
            saves: 0,
        };
        assert_eq!(did_not_play.flags().shutout, 0);
        assert_eq!(goalie_points(&did_not_play, &GoalieWeights::default()), 0.0);

        let shutout = GoalieStatLine {
            decision: Some(Decision::Win),
            goals_against: 0,
            saves: 25,
        };
        assert_eq!(shutout.flags().shutout, 1);
        // 4 + 0 + 5 + 3
        assert_eq!(goalie_points(&shutout, &GoalieWeights::default()), 12.0);
    }

    #[test]
    fn test_goalie_overtime_loss() {
        let line = GoalieStatLine {
            decision: Some(Decision::OvertimeLoss),
            goals_against: 3,
            saves: 31,
        };

        // 0 - 6 + 6.2 + 0 + 1
        assert_eq!(goalie_points(&line, &GoalieWeights::default()), 1.2);
        assert_eq!(line.flags().ot_loss, 1);
        assert_eq!(line.flags().win, 0);
    }

    #[test]
    fn test_round2_guards_non_finite() {
        assert_eq!(round2(f64::NAN), 0.0);
        assert_eq!(round2(f64::INFINITY), 0.0);
        assert_eq!(round2(1.005_000_1), 1.01);
        assert_eq!(round2(-0.001), 0.0);
        assert!(round2(-0.001).is_sign_positive());
    }

    #[test]
    fn test_centipoints() {
        assert_eq!(to_centipoints(7.2), 720);
        assert_eq!(to_centipoints(-3.45), -345);
        assert_eq!(to_centipoints(f64::NAN), 0);
        assert_eq!(from_centipoints(1260), 12.6);
    }

    #[test]
    fn test_toi_to_seconds() {
        assert_eq!(toi_to_seconds("21:14"), 1274);
        assert_eq!(toi_to_seconds("00:00"), 0);
        assert_eq!(toi_to_seconds("65:03"), 3903);
        assert_eq!(toi_to_seconds("garbage"), 0);
        assert_eq!(toi_to_seconds("12:75"), 0);
        assert_eq!(toi_to_seconds(""), 0);
    }

    #[test]
    fn test_shooting_pct() {
        assert_eq!(shooting_pct(1, 4), Some(25.0));
        assert_eq!(shooting_pct(1, 3), Some(33.33));
        assert_eq!(shooting_pct(0, 0), None);
    }
}
