use cucumber::given;
use matchday_engine::db_types::{NewLoan, NewMatch, NewTeam};

use crate::cucumber::{
    world::{parse_date, parse_time, MatchdaySystem},
    MatchdayWorld,
};

#[given("a fresh install")]
async fn fresh_database(world: &mut MatchdayWorld) {
    let system = MatchdaySystem::new().await;
    world.system = Some(system);
}

#[given(expr = "team {string} captained by {string} on {string}")]
async fn register_team(world: &mut MatchdayWorld, name: String, captain: String, phone: String) {
    let team = NewTeam::new(name.as_str(), captain.as_str(), phone.as_str());
    let team = world.system().teams.create_team(team).await.expect("Error registering team");
    world.teams.insert(name, team.id);
}

#[given(expr = "a match between {string} and {string} on {word} at {word}")]
async fn schedule_match(world: &mut MatchdayWorld, home: String, away: String, date: String, time: String) {
    let fixture =
        NewMatch::new(world.team_id(&home), world.team_id(&away), parse_date(&date)).with_time(parse_time(&time));
    let fixture = world.system().matches.create_match(fixture, world.now()).await.expect("Error scheduling match");
    world.current_match = Some(fixture.id);
}

#[given(expr = "a match between {string} and {string} on {word} with no kickoff time")]
async fn schedule_match_without_time(world: &mut MatchdayWorld, home: String, away: String, date: String) {
    let fixture = NewMatch::new(world.team_id(&home), world.team_id(&away), parse_date(&date));
    let fixture = world.system().matches.create_match(fixture, world.now()).await.expect("Error scheduling match");
    world.current_match = Some(fixture.id);
}

#[given(expr = "{string} borrows {int} players for the match")]
async fn borrow_players(world: &mut MatchdayWorld, team: String, players: i64) {
    let loan = NewLoan::new(world.team_id(&team), world.match_id(), players);
    let loan = world.system().loans.create_loan(loan, world.now()).await.expect("Error creating loan");
    world.current_loan = Some(loan.id);
}
