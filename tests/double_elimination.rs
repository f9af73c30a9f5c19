//! Double elimination progression: loser drop-in, loser final, grand final.

mod common;

use common::{
    bracket_with_teams, id_of, losses, match_at, play_out, play_with_walkovers, round_matches,
    team1, team2, team_names,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use sportfest_brackets::{
    complete_match, generate, Advance, BracketError, BracketId, BracketStore, EliminationType,
    MemoryStore, PreserveOrder, RngSource, Round, SkipReason, Side, Team,
};

fn seeded_in_order(n: usize) -> (MemoryStore, BracketId, Vec<Team>) {
    let names = team_names(n);
    let names: Vec<&str> = names.iter().map(String::as_str).collect();
    let (mut store, bracket_id, teams) = bracket_with_teams(&names, EliminationType::Double);
    generate(&mut store, bracket_id, EliminationType::Double, &mut PreserveOrder).unwrap();
    (store, bracket_id, teams)
}

#[test]
fn round_one_losers_share_the_first_loser_match() {
    let (mut store, bracket_id, teams) =
        bracket_with_teams(&["A", "B", "C", "D"], EliminationType::Double);
    generate(&mut store, bracket_id, EliminationType::Double, &mut PreserveOrder).unwrap();

    let m1 = match_at(&store, bracket_id, Round::Winner(1), 0);
    let m2 = match_at(&store, bracket_id, Round::Winner(1), 1);

    let first = complete_match(&mut store, m1.id, id_of(&teams, "A"), None).unwrap();
    assert!(first.winner_advanced());
    assert!(first.loser_advanced());
    assert!(matches!(
        first.loser,
        Advance::Placed { round: Round::Loser(1), side: Side::Team1, .. }
    ));

    let second = complete_match(&mut store, m2.id, id_of(&teams, "C"), None).unwrap();
    assert!(matches!(
        second.winner,
        Advance::Placed { round: Round::Winner(2), side: Side::Team2, .. }
    ));

    let losers = round_matches(&store, bracket_id, Round::Loser(1));
    assert_eq!(losers.len(), 1);
    assert_eq!(losers[0].team1_id, Some(id_of(&teams, "B")));
    assert_eq!(losers[0].team2_id, Some(id_of(&teams, "D")));

    let wb_final = match_at(&store, bracket_id, Round::Winner(2), 0);
    assert_eq!(wb_final.team1_id, Some(id_of(&teams, "A")));
    assert_eq!(wb_final.team2_id, Some(id_of(&teams, "C")));
}

#[test]
fn four_teams_full_run() {
    let (mut store, bracket_id, teams) =
        bracket_with_teams(&["A", "B", "C", "D"], EliminationType::Double);
    generate(&mut store, bracket_id, EliminationType::Double, &mut PreserveOrder).unwrap();

    let results = play_out(&mut store, bracket_id, team1);
    assert_eq!(results.len(), 6);

    let complete: Vec<_> = results.iter().filter(|r| r.tournament_complete).collect();
    assert_eq!(complete.len(), 1);
    assert_eq!(complete[0].completed.round, Round::Championship);
    assert_eq!(complete[0].champion, Some(id_of(&teams, "A")));

    let grand_final = match_at(&store, bracket_id, Round::Championship, 0);
    assert_eq!(grand_final.team1_id, Some(id_of(&teams, "A")));
    assert_eq!(grand_final.team2_id, Some(id_of(&teams, "C")));

    let loser_final = match_at(&store, bracket_id, Round::Loser(2), 0);
    assert_eq!(loser_final.team1_id, Some(id_of(&teams, "C")));
    assert_eq!(loser_final.team2_id, Some(id_of(&teams, "B")));

    assert_eq!(
        store.get_bracket(bracket_id).unwrap().unwrap().winner_team_id,
        Some(id_of(&teams, "A"))
    );
    assert!(store.list_matches(bracket_id).unwrap().iter().all(|m| m.is_completed()));
}

#[test]
fn grand_final_is_decisive_for_loser_bracket_champion() {
    let (mut store, bracket_id, teams) =
        bracket_with_teams(&["A", "B", "C", "D"], EliminationType::Double);
    generate(&mut store, bracket_id, EliminationType::Double, &mut PreserveOrder).unwrap();

    let results = play_out(&mut store, bracket_id, team2);
    let last = results.last().unwrap();

    let grand_final = match_at(&store, bracket_id, Round::Championship, 0);
    assert_eq!(grand_final.team1_id, Some(id_of(&teams, "D")));
    assert_eq!(grand_final.team2_id, Some(id_of(&teams, "C")));

    assert!(last.tournament_complete);
    assert_eq!(last.champion, Some(id_of(&teams, "C")));
    assert!(round_matches(&store, bracket_id, Round::ResetChampionship).is_empty());
}

#[test]
fn loser_final_fills_championship_team2() {
    let (mut store, bracket_id, teams) =
        bracket_with_teams(&["A", "B", "C", "D"], EliminationType::Double);
    generate(&mut store, bracket_id, EliminationType::Double, &mut PreserveOrder).unwrap();
    let pick = |name: &str| id_of(&teams, name);

    let m1 = match_at(&store, bracket_id, Round::Winner(1), 0);
    let m2 = match_at(&store, bracket_id, Round::Winner(1), 1);
    complete_match(&mut store, m1.id, pick("A"), None).unwrap();
    complete_match(&mut store, m2.id, pick("C"), None).unwrap();

    let l1 = match_at(&store, bracket_id, Round::Loser(1), 0);
    let r = complete_match(&mut store, l1.id, pick("D"), None).unwrap();
    assert!(matches!(
        r.winner,
        Advance::Placed { round: Round::Loser(2), side: Side::Team1, .. }
    ));
    assert_eq!(r.loser, Advance::NotApplicable);

    let wb_final = match_at(&store, bracket_id, Round::Winner(2), 0);
    let r = complete_match(&mut store, wb_final.id, pick("C"), None).unwrap();
    assert!(matches!(
        r.winner,
        Advance::Placed { round: Round::Championship, side: Side::Team1, .. }
    ));
    assert!(matches!(
        r.loser,
        Advance::Placed { round: Round::Loser(2), side: Side::Team2, .. }
    ));

    let l2 = match_at(&store, bracket_id, Round::Loser(2), 0);
    let r = complete_match(&mut store, l2.id, pick("A"), None).unwrap();
    assert!(matches!(
        r.winner,
        Advance::Placed { round: Round::Championship, side: Side::Team2, .. }
    ));
    assert!(!r.tournament_complete);
}

#[test]
fn eight_team_losers_fill_lowest_open_matches() {
    let names = team_names(8);
    let names: Vec<&str> = names.iter().map(String::as_str).collect();
    let (mut store, bracket_id, teams) = bracket_with_teams(&names, EliminationType::Double);
    generate(&mut store, bracket_id, EliminationType::Double, &mut PreserveOrder).unwrap();

    for order in 0..4 {
        let m = match_at(&store, bracket_id, Round::Winner(1), order);
        complete_match(&mut store, m.id, team1(&m), None).unwrap();
    }

    let losers = round_matches(&store, bracket_id, Round::Loser(1));
    assert_eq!(losers.len(), 2);
    assert_eq!(losers[0].team1_id, Some(id_of(&teams, "T1")));
    assert_eq!(losers[0].team2_id, Some(id_of(&teams, "T3")));
    assert_eq!(losers[1].team1_id, Some(id_of(&teams, "T5")));
    assert_eq!(losers[1].team2_id, Some(id_of(&teams, "T7")));
}

#[test]
fn missing_loser_round_is_reported_not_fatal() {
    // Two teams: no loser rounds exist, so the loser has nowhere to drop.
    let (mut store, bracket_id, teams) = bracket_with_teams(&["A", "B"], EliminationType::Double);
    generate(&mut store, bracket_id, EliminationType::Double, &mut PreserveOrder).unwrap();

    let opener = match_at(&store, bracket_id, Round::Winner(1), 0);
    let r = complete_match(&mut store, opener.id, id_of(&teams, "A"), None).unwrap();
    assert_eq!(
        r.loser,
        Advance::Skipped {
            reason: SkipReason::NoTargetMatch
        }
    );
    assert!(matches!(
        r.winner,
        Advance::Placed { round: Round::Championship, side: Side::Team1, .. }
    ));
    assert!(r.completed.is_completed());

    let grand_final = match_at(&store, bracket_id, Round::Championship, 0);
    let r = complete_match(&mut store, grand_final.id, id_of(&teams, "A"), None).unwrap();
    assert!(r.tournament_complete);
}

#[test]
fn loser_match_waits_for_second_drop() {
    let (mut store, bracket_id, teams) =
        bracket_with_teams(&["A", "B", "C", "D"], EliminationType::Double);
    generate(&mut store, bracket_id, EliminationType::Double, &mut PreserveOrder).unwrap();

    let m1 = match_at(&store, bracket_id, Round::Winner(1), 0);
    complete_match(&mut store, m1.id, id_of(&teams, "A"), None).unwrap();

    let l1 = match_at(&store, bracket_id, Round::Loser(1), 0);
    assert_eq!((l1.team1_id, l1.team2_id), (Some(id_of(&teams, "B")), None));
    let early = complete_match(&mut store, l1.id, id_of(&teams, "B"), None);
    assert!(matches!(early, Err(BracketError::MatchNotReady(id)) if id == l1.id));

    let m2 = match_at(&store, bracket_id, Round::Winner(1), 1);
    let r = complete_match(&mut store, m2.id, id_of(&teams, "C"), None).unwrap();
    assert!(matches!(
        r.loser,
        Advance::Placed { round: Round::Loser(1), side: Side::Team2, .. }
    ));
    assert!(match_at(&store, bracket_id, Round::Loser(1), 0).is_ready());
}

#[test]
fn grand_final_waits_for_loser_final() {
    let (mut store, bracket_id, _) = seeded_in_order(4);
    for order in 0..2 {
        let m = match_at(&store, bracket_id, Round::Winner(1), order);
        complete_match(&mut store, m.id, team1(&m), None).unwrap();
    }
    let wb_final = match_at(&store, bracket_id, Round::Winner(2), 0);
    complete_match(&mut store, wb_final.id, team1(&wb_final), None).unwrap();

    let grand_final = match_at(&store, bracket_id, Round::Championship, 0);
    assert_eq!(grand_final.team2_id, None);
    let early = complete_match(&mut store, grand_final.id, team1(&grand_final), None);
    assert!(matches!(early, Err(BracketError::MatchNotReady(_))));
    assert_eq!(store.get_bracket(bracket_id).unwrap().unwrap().winner_team_id, None);
}

#[test]
fn three_teams_reach_a_champion_through_a_walkover() {
    let (mut store, bracket_id, teams) = seeded_in_order(3);

    let results = play_with_walkovers(&mut store, bracket_id, team1);
    assert_eq!(results.len(), 5);

    // T1 drops alone into loser round 1 and moves on without playing.
    let walkover = results
        .iter()
        .find(|r| r.completed.round == Round::Loser(1))
        .unwrap();
    assert!(walkover.completed.is_bye());
    assert_eq!(walkover.completed.winner_id, Some(id_of(&teams, "T1")));
    assert!(matches!(
        walkover.winner,
        Advance::Placed { round: Round::Loser(2), .. }
    ));

    let complete: Vec<_> = results.iter().filter(|r| r.tournament_complete).collect();
    assert_eq!(complete.len(), 1);
    let champion = id_of(&teams, "T0");
    assert_eq!(complete[0].champion, Some(champion));

    let lost = losses(&store, bracket_id);
    for team in teams.iter().filter(|t| t.id != champion) {
        assert_eq!(lost.get(&team.id), Some(&2), "{}", team.name);
    }
}

#[test]
fn eight_teams_reach_a_champion() {
    let (mut store, bracket_id, teams) = seeded_in_order(8);

    let results = play_with_walkovers(&mut store, bracket_id, team1);
    assert_eq!(results.len(), 15);
    assert!(results.iter().all(|r| !matches!(r.loser, Advance::Skipped { .. })));

    let walkovers: Vec<_> = results.iter().filter(|r| r.completed.is_bye()).collect();
    assert_eq!(walkovers.len(), 1);
    assert_eq!(walkovers[0].completed.round, Round::Loser(3));

    let champion = id_of(&teams, "T0");
    let last = results.last().unwrap();
    assert!(last.tournament_complete);
    assert_eq!(last.completed.round, Round::Championship);
    assert_eq!(last.champion, Some(champion));

    let grand_final = match_at(&store, bracket_id, Round::Championship, 0);
    assert_eq!(grand_final.team2_id, Some(id_of(&teams, "T4")));

    let lost = losses(&store, bracket_id);
    for team in teams.iter().filter(|t| t.id != champion) {
        assert_eq!(lost.get(&team.id), Some(&2), "{}", team.name);
    }
}

#[test]
fn full_loser_round_reports_no_open_slot() {
    // Seven teams: three real round-1 matches, but loser round 1 holds one match.
    let (mut store, bracket_id, teams) = seeded_in_order(7);
    assert_eq!(round_matches(&store, bracket_id, Round::Loser(1)).len(), 1);

    let mut results = Vec::new();
    for order in 0..3 {
        let m = match_at(&store, bracket_id, Round::Winner(1), order);
        results.push(complete_match(&mut store, m.id, team1(&m), None).unwrap());
    }
    assert!(results[0].loser_advanced());
    assert!(results[1].loser_advanced());
    assert_eq!(
        results[2].loser,
        Advance::Skipped {
            reason: SkipReason::NoOpenSlot
        }
    );
    assert!(results[2].completed.is_completed());

    let l1 = match_at(&store, bracket_id, Round::Loser(1), 0);
    assert_eq!(l1.team1_id, Some(id_of(&teams, "T1")));
    assert_eq!(l1.team2_id, Some(id_of(&teams, "T3")));

    let rest = play_with_walkovers(&mut store, bracket_id, team1);
    assert_eq!(rest.last().unwrap().champion, Some(id_of(&teams, "T0")));
}

#[test]
fn every_size_crowns_one_champion() {
    for n in 2..=16 {
        let names = team_names(n);
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        let (mut store, bracket_id, _) = bracket_with_teams(&names, EliminationType::Double);
        generate(
            &mut store,
            bracket_id,
            EliminationType::Double,
            &mut RngSource(StdRng::seed_from_u64(n as u64)),
        )
        .unwrap();

        let results = play_with_walkovers(&mut store, bracket_id, |m| {
            if m.match_order % 2 == 0 { team1(m) } else { team2(m) }
        });
        let finals: Vec<_> = results.iter().filter(|r| r.tournament_complete).collect();
        assert_eq!(finals.len(), 1, "{n} teams");
        assert_eq!(finals[0].completed.round, Round::Championship, "{n} teams");

        let bracket = store.get_bracket(bracket_id).unwrap().unwrap();
        assert_eq!(bracket.winner_team_id, finals[0].champion, "{n} teams");
        let stranded = store
            .list_matches(bracket_id)
            .unwrap()
            .into_iter()
            .filter(|m| !m.is_completed() && (m.team1_id.is_some() || m.team2_id.is_some()))
            .count();
        assert_eq!(stranded, 0, "{n} teams");
    }
}
