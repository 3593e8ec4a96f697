use cucumber::{given, then, when};
use matchday_engine::{
    db_types::{LoanStatus, MatchStatus, MatchUpdate, NewLoan},
    lifecycle,
    match_objects::MatchView,
    ClubApiError,
    LoanManagement,
    MatchManagement,
};

use crate::cucumber::{
    world::{parse_date, parse_time},
    MatchdayWorld,
};

#[given(expr = "the time is {word} {word}")]
#[when(expr = "the time is {word} {word}")]
async fn set_time(world: &mut MatchdayWorld, date: String, time: String) {
    world.now = Some(parse_date(&date).and_time(parse_time(&time)));
}

#[when(expr = "the match status is set to {word}")]
async fn set_match_status(world: &mut MatchdayWorld, status: String) {
    let status = status.parse::<MatchStatus>().expect("Unknown match status");
    let update = MatchUpdate::default().with_status(status);
    world.system().matches.update_match(world.match_id(), update, world.now()).await.expect("Error updating status");
}

#[when(expr = "I try to set the match status to {word}")]
async fn try_set_match_status(world: &mut MatchdayWorld, status: String) {
    let status = status.parse::<MatchStatus>().expect("Unknown match status");
    let update = MatchUpdate::default().with_status(status);
    let result = world.system().matches.update_match(world.match_id(), update, world.now()).await;
    world.last_error = result.err();
}

#[when(expr = "{string} tries to borrow {int} players for the match")]
async fn try_borrow_players(world: &mut MatchdayWorld, team: String, players: i64) {
    let loan = NewLoan::new(world.team_id(&team), world.match_id(), players);
    let result = world.system().loans.create_loan(loan, world.now()).await;
    world.last_error = result.err();
}

#[when("I try to delete the match")]
async fn try_delete_match(world: &mut MatchdayWorld) {
    let result = world.system().matches.delete_match(world.match_id(), world.now()).await;
    world.last_error = result.err();
}

#[when("the auto-finish sweep runs")]
async fn auto_finish_sweep(world: &mut MatchdayWorld) {
    let result = world.system().matches.run_auto_finish_sweep(world.now()).await.expect("Auto-finish sweep failed");
    assert_eq!(result.failed_count(), 0);
}

#[when("the loan completion sweep runs")]
async fn loan_completion_sweep(world: &mut MatchdayWorld) {
    world.system().loans.complete_loans_for_finished_matches().await.expect("Loan completion sweep failed");
}

#[then("the match should be due to finish")]
async fn match_is_due(world: &mut MatchdayWorld) {
    let fixture = world.system().db.fetch_match(world.match_id()).await.expect("Error fetching match").unwrap();
    assert!(lifecycle::should_auto_finish(fixture.match_date, fixture.match_time, fixture.status, world.now()));
}

#[then(expr = "the match status is {word}")]
async fn check_match_status(world: &mut MatchdayWorld, status: String) {
    let expected = status.parse::<MatchStatus>().expect("Unknown match status");
    let fixture = world.system().db.fetch_match(world.match_id()).await.expect("Error fetching match").unwrap();
    assert_eq!(fixture.status, expected);
}

#[then(expr = "the match clock shows {string}")]
async fn check_match_clock(world: &mut MatchdayWorld, display: String) {
    let fixture = world.system().db.fetch_match(world.match_id()).await.expect("Error fetching match").unwrap();
    let view = MatchView::new(fixture, world.now());
    assert_eq!(view.clock.elapsed_display, Some(display));
}

#[then(expr = "the loan status is {word}")]
async fn check_loan_status(world: &mut MatchdayWorld, status: String) {
    let expected = status.parse::<LoanStatus>().expect("Unknown loan status");
    let loan = world.system().db.fetch_loan(world.loan_id()).await.expect("Error fetching loan").unwrap();
    assert_eq!(loan.status, expected);
}

#[when(expr = "I load the schedule for {word}")]
async fn load_schedule(world: &mut MatchdayWorld, date: String) {
    let fixtures =
        world.system().matches.matches_for_date(parse_date(&date), world.now()).await.expect("Error loading schedule");
    assert!(fixtures.iter().any(|m| m.id == world.match_id()), "The match is missing from the schedule");
}

#[then("the request is rejected because the match has started")]
async fn rejected_match_started(world: &mut MatchdayWorld) {
    let err = world.last_error.take().expect("The request should have failed");
    assert_eq!(err, ClubApiError::MatchAlreadyStarted(world.match_id()));
}

#[then(expr = "the request is rejected with a forbidden change from {word} to {word}")]
async fn rejected_status_change(world: &mut MatchdayWorld, from: String, to: String) {
    let err = world.last_error.take().expect("The request should have failed");
    let from = from.parse::<MatchStatus>().expect("Unknown match status");
    let to = to.parse::<MatchStatus>().expect("Unknown match status");
    assert_eq!(err, ClubApiError::ForbiddenStatusChange { from, to });
}
