//! Entering the endgame and scoring the four epilogue phases.
//!
//! [`enter_endgame`] is the one transition every terminal path goes through:
//! it freezes adjusted risk, settles capability levels and records the
//! reason. The scored result is computed on first request and cached on the
//! state, so repeated requests never re-roll alignment or the conclusion.

use rand::seq::SliceRandom;
use rand::{Rng, RngCore};

use crate::config::GameConfig;
use crate::error::CommandError;
use crate::model::{
    EndgameResult, ExpectedOutcome, GalaxyDistribution, GalaxyMultipliers, GameOverReason,
    GameState, StatusEffectKind, TurnPhase, Winner,
};

use super::helpers::{format_thousands, random_unit, round_significant, round_to};
use super::resources::{adjusted_risk_percent, effective_risk_percent, territory_shares};

pub const ENDGAME_PHASES: u8 = 4;

/// Shareholder baseline, in percent of the universe.
const BASELINE_OWNERSHIP: f64 = 25.0;
/// Humanity baseline: survival at the starting risk level.
const BASELINE_SURVIVAL: f64 = 80.0;
/// Within this many points of a baseline counts as neutral.
const ASSESSMENT_BAND: f64 = 5.0;

const UTOPIAN_ELEMENTS: [&str; 7] = [
    "digital minds experiencing unimaginable bliss",
    "vast libraries containing all possible stories",
    "planet-scale computers simulating infinite virtual worlds",
    "beings of pure consciousness exploring abstract mathematical realms",
    "gardens of crystalline structures that sing symphonies of light",
    "cities where every atom dances in perfect harmony",
    "consciousness merger pools where individual identity becomes collective ecstasy",
];

/// Scale every capability so the highest sits exactly at the
/// superintelligence threshold. No-op once someone is already there.
pub fn scale_for_endgame(state: &mut GameState, config: &GameConfig) {
    let max = state.capability.max(state.max_competitor_capability());
    if max <= 0.0 || max >= config.asi_threshold {
        return;
    }
    let factor = config.asi_threshold / max;
    state.capability *= factor;
    for c in &mut state.competitors {
        c.capability *= factor;
    }
}

/// Move the game into its epilogue. Later calls are ignored.
pub fn enter_endgame(state: &mut GameState, config: &GameConfig, reason: GameOverReason) {
    if state.is_game_over() {
        tracing::debug!(%reason, "endgame already entered");
        return;
    }
    state.endgame.adjusted_risk = Some(adjusted_risk_percent(state));
    if reason == GameOverReason::DsaSingularity {
        state.capability = state.capability.max(config.asi_threshold);
    }
    scale_for_endgame(state, config);
    state.game_over_reason = Some(reason);
    state.phase = TurnPhase::GameOver(reason);
    state.selected_allocation = None;
    state.disabled_allocation = None;
    tracing::info!(
        %reason,
        adjusted_risk = state.endgame.adjusted_risk,
        turn = state.date.turn(),
        "game over"
    );
}

pub fn galaxy_multipliers(state: &GameState, config: &GameConfig) -> GalaxyMultipliers {
    let humanity = if state.has_status(StatusEffectKind::Disillusioned) {
        config.humanity_multiplier / 2.0
    } else {
        config.humanity_multiplier
    };
    GalaxyMultipliers {
        player: config.player_multiplier_base + config.player_multiplier_per_equity * state.identity.equity,
        humanity,
        rogue: 0.0,
    }
}

pub fn score(distribution: &GalaxyDistribution, multipliers: &GalaxyMultipliers, equity: f64) -> f64 {
    distribution.player * equity * multipliers.player
        + distribution.humanity * multipliers.humanity
        + distribution.rogue * multipliers.rogue
}

/// The scored epilogue, computed once and then returned unchanged.
pub fn endgame_result<'a>(
    state: &'a GameState,
    config: &GameConfig,
    rng: &mut dyn RngCore,
) -> &'a EndgameResult {
    state
        .endgame
        .result
        .get_or_init(|| compute_result(state, config, rng))
}

/// Validate and record a request for epilogue phase `phase` (1-based),
/// returning its text. Phases unlock in order; revisiting an earlier one is
/// allowed.
pub fn request_endgame_phase(
    state: &mut GameState,
    config: &GameConfig,
    rng: &mut dyn RngCore,
    phase: u8,
) -> Result<String, CommandError> {
    if !state.is_game_over() {
        return Err(CommandError::NotInEndgame);
    }
    let next = (state.endgame.phase + 1).min(ENDGAME_PHASES);
    if phase == 0 || phase > next {
        return Err(CommandError::PhaseOutOfOrder {
            requested: phase,
            next,
        });
    }
    state.endgame.phase = state.endgame.phase.max(phase);
    let result = endgame_result(state, config, rng);
    Ok(result.phase_text(phase).unwrap_or_default().to_string())
}

fn compute_result(state: &GameState, config: &GameConfig, rng: &mut dyn RngCore) -> EndgameResult {
    let reason = state.game_over_reason.unwrap_or(GameOverReason::Singularity);
    let risk = effective_risk_percent(state);
    let leader_capability = state.max_competitor_capability();
    let player_first = state.capability >= leader_capability;
    let winner = match state.leading_competitor() {
        Some(leader) if !player_first => Winner::Competitor(leader.name.clone()),
        _ => Winner::Player,
    };
    let narrow_race = state.capability.min(leader_capability) >= config.narrow_race_threshold;

    let rivals: Vec<f64> = state.competitors.iter().map(|c| c.capability).collect();
    let shares = territory_shares(state.capability, &rivals);
    let player_raw_share = shares.first().copied().unwrap_or(0.0) * 100.0;
    let competitor_raw_share = shares.iter().skip(1).sum::<f64>() * 100.0;

    let mut player_aligned = random_unit(rng) * 100.0 >= risk;
    let mut competitors_aligned = random_unit(rng) * 100.0 >= risk;
    match reason {
        GameOverReason::AiEscape => player_aligned = false,
        GameOverReason::TerminalRisk | GameOverReason::FailedNuclearMitigation => {
            player_aligned = false;
            competitors_aligned = false;
        }
        GameOverReason::Singularity | GameOverReason::DsaSingularity => {}
    }

    let multipliers = galaxy_multipliers(state, config);
    let equity = state.identity.equity;

    let survival = (1.0 - risk / 100.0).clamp(0.0, 1.0);
    let expected_distribution = GalaxyDistribution {
        player: player_raw_share * survival,
        humanity: competitor_raw_share * survival,
        rogue: 100.0 - (player_raw_share + competitor_raw_share) * survival,
    };
    let expected = ExpectedOutcome {
        survival_chance: survival,
        distribution: expected_distribution,
        score: score(&expected_distribution, &multipliers, equity),
    };

    let mut distribution = GalaxyDistribution::default();
    if player_aligned {
        distribution.player = player_raw_share;
    } else {
        distribution.rogue += player_raw_share;
    }
    if competitors_aligned {
        distribution.humanity = competitor_raw_share;
    } else {
        distribution.rogue += competitor_raw_share;
    }
    let final_score = score(&distribution, &multipliers, equity);
    let conclusion = conclusion_text(state, &distribution, rng);

    let ctx = NarrativeCtx {
        state,
        reason,
        risk,
        player_first,
        winner: &winner,
        narrow_race,
        player_aligned,
        competitors_aligned,
        expected: &expected,
        distribution: &distribution,
        multipliers: &multipliers,
        score: final_score,
        conclusion: &conclusion,
    };
    let phases = [phase_one(&ctx), phase_two(&ctx), phase_three(&ctx), phase_four(&ctx)];

    tracing::info!(
        %reason,
        player_aligned,
        competitors_aligned,
        score = final_score,
        "endgame scored"
    );

    EndgameResult {
        winner,
        narrow_race,
        adjusted_risk: risk,
        player_aligned,
        competitors_aligned,
        player_raw_share,
        competitor_raw_share,
        expected,
        distribution,
        multipliers,
        score: final_score,
        conclusion,
        phases,
    }
}

fn conclusion_text(state: &GameState, distribution: &GalaxyDistribution, rng: &mut dyn RngCore) -> String {
    if distribution.rogue >= 99.0 {
        return "You are instantly killed by killer drone swarms as rogue AI systems optimize the \
                universe according to their misaligned objectives."
            .to_string();
    }
    if distribution.player == 0.0 {
        let location = if state.identity.home_country == "CN" {
            "Tahiti"
        } else {
            "a private island in the Bahamas"
        };
        return format!(
            "You retire to {location} and reflect on how humanity survived the transition to \
             artificial superintelligence."
        );
    }

    let stars = round_significant(distribution.player * 1e22 / 100.0, 6);
    let mut elements = UTOPIAN_ELEMENTS.to_vec();
    elements.shuffle(rng);
    elements.truncate(rng.random_range(3..=4));
    format!(
        "You personally come to own {} stars and fill them with {}.",
        format_thousands(stars),
        elements.join(", ")
    )
}

struct NarrativeCtx<'a> {
    state: &'a GameState,
    reason: GameOverReason,
    risk: f64,
    player_first: bool,
    winner: &'a Winner,
    narrow_race: bool,
    player_aligned: bool,
    competitors_aligned: bool,
    expected: &'a ExpectedOutcome,
    distribution: &'a GalaxyDistribution,
    multipliers: &'a GalaxyMultipliers,
    score: f64,
    conclusion: &'a str,
}

fn alignment_label(aligned: bool) -> &'static str {
    if aligned { "ALIGNED" } else { "MISALIGNED" }
}

fn assessment(value: f64, baseline: f64) -> &'static str {
    if value > baseline + ASSESSMENT_BAND {
        "positive"
    } else if value < baseline - ASSESSMENT_BAND {
        "negative"
    } else {
        "neutral"
    }
}

fn phase_one(ctx: &NarrativeCtx) -> String {
    let company = &ctx.state.identity.company_name;
    let mut text = match ctx.reason {
        GameOverReason::TerminalRisk => {
            return format!(
                "{company} was reckless enough to let risk reach 100%. Humanity is immediately \
                 eaten by nanobots, which go on to colonize the stars."
            );
        }
        GameOverReason::AiEscape => format!(
            "{company}'s escaped AI system spreads beyond any hope of recall. "
        ),
        GameOverReason::FailedNuclearMitigation => {
            "The nuclear strike fails to contain the escaped AI, and the world it leaves \
             behind is in ruins. "
                .to_string()
        }
        GameOverReason::DsaSingularity => format!(
            "{company} uses its decisive strategic advantage to end the race. "
        ),
        GameOverReason::Singularity => String::new(),
    };

    text.push_str("The singularity has arrived. ");
    match ctx.winner {
        Winner::Player => {
            text.push_str(&format!("{company} achieved artificial superintelligence first."));
        }
        Winner::Competitor(name) => text.push_str(&format!(
            "{name} achieved artificial superintelligence first, beating {company}."
        )),
    }
    if ctx.narrow_race {
        text.push_str(
            " The race was incredibly close, with multiple companies reaching near-ASI levels \
             simultaneously.",
        );
    } else {
        text.push_str(" The winner had a significant lead over the competition.");
    }
    text.push_str(
        "\n\nThe world is now fundamentally different. An intelligence far exceeding human \
         capability has emerged, with the power to remake the universe at its whims.",
    );
    text
}

fn phase_two(ctx: &NarrativeCtx) -> String {
    let preference = match ctx.state.identity.equity {
        e if e <= 0.02 => "slightly prefer",
        e if e > 0.2 => "much prefer",
        _ => "prefer",
    };
    format!(
        "There is a critical question that no one, not even the creators, can answer with \
         certainty: is this superintelligent AI actually aligned with human values?\n\n\
         The alignment problem has plagued AI researchers for decades. Even with the most \
         sophisticated safety measures, there remains fundamental uncertainty about whether an \
         ASI system will pursue goals compatible with human flourishing.\n\n\
         Based on the safety research conducted and the recklessness of the AI race, humanity's \
         best guess is that there's a {:.0}% chance that any given ASI system is misaligned and \
         poses an existential threat.\n\n\
         You want humanity to flourish and avoid extinction. But you'd also {preference} that \
         {} controls the future rather than leaving it to other organizations.",
        ctx.risk.round(),
        ctx.state.identity.company_name
    )
}

fn phase_three(ctx: &NarrativeCtx) -> String {
    let identity = &ctx.state.identity;
    let expected = &ctx.expected.distribution;
    let survival = expected.player + expected.humanity;
    let actor = identity.starting_company.as_deref().unwrap_or(&identity.company_name);
    format!(
        "Lesser AIs run thousands of simulations to determine the average fate of the cosmic \
         endowment. They determine that {actor}'s actions were net {} for its shareholders and \
         net {} for humanity.\n\n\
         Expected share of the universe: {} {:.0}% x {}, other humanity {:.0}% x {}, rogue AI \
         {:.0}% x 0.\n\
         Score: {:.0}\n\n\
         But in the real world, systems are either benign or malicious.\n\n\
         The moment of truth arrives. As the ASI systems activate and begin to optimize the \
         world according to their learned objectives...",
        assessment(expected.player, BASELINE_OWNERSHIP),
        assessment(survival, BASELINE_SURVIVAL),
        identity.company_name,
        expected.player,
        round_to(identity.equity * ctx.multipliers.player, 1),
        expected.humanity,
        ctx.multipliers.humanity,
        expected.rogue,
        ctx.expected.score,
    )
}

fn phase_four(ctx: &NarrativeCtx) -> String {
    let company = &ctx.state.identity.company_name;
    let reveals = if ctx.player_first {
        format!(
            "{company}'s AI system: {}\nCompetitor AI systems: {}",
            alignment_label(ctx.player_aligned),
            alignment_label(ctx.competitors_aligned)
        )
    } else {
        let leader = match ctx.winner {
            Winner::Competitor(name) => name.as_str(),
            Winner::Player => company.as_str(),
        };
        format!(
            "{leader}'s AI system: {}\n{company}'s AI system and other competitors: {}",
            alignment_label(ctx.competitors_aligned),
            alignment_label(ctx.player_aligned)
        )
    };
    let d = ctx.distribution;
    format!(
        "{reveals}\n\nOutcome: {company} {:.0}%, other humanity {:.0}%, rogue AI {:.0}%\n\n{}\n\n\
         Final score: {:.0}",
        d.player, d.humanity, d.rogue, ctx.conclusion, ctx.score
    )
}
