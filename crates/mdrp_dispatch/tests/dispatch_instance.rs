mod test_utils;

use std::sync::Arc;

use mdrp_dispatch::{
    dispatch::{
        commitment::CommitmentStrategy,
        dispatcher::Dispatcher,
        matching::MatchingStrategy,
        params::{DispatchParams, Threads},
        statistics::DispatchStatistics,
    },
    improve::{params::{ImprovementParams, Termination}, search::PlanImprover},
    json::types::JsonDispatchResult,
    parsers::instance_dir::InstanceDirParser,
};

#[test]
fn test_fixture_is_instance_dir() {
    assert!(InstanceDirParser::is_instance_dir(test_utils::fixture_path(
        "tiny"
    )));
    assert!(!InstanceDirParser::is_instance_dir(test_utils::fixture_path(
        "missing"
    )));
}

#[test]
fn test_parse_fixture() {
    let problem = test_utils::load_fixture("tiny");

    assert_eq!(problem.id(), Some("tiny"));
    assert_eq!(problem.orders().len(), 5);
    assert_eq!(problem.restaurants().len(), 2);
    assert_eq!(problem.couriers().len(), 2);
    assert_eq!(problem.parameters().meters_per_minute, 320.0);

    let o1 = problem.order_idx("o1").unwrap();
    let r1 = problem.restaurant_idx("r1").unwrap();
    assert_eq!(problem.order(o1).restaurant_id(), r1);
    assert_eq!(
        problem.travel_time(problem.restaurant_location(r1), problem.order(o1).location_id()),
        2.0
    );
}

#[test]
fn test_dispatch_fixture() {
    let problem = test_utils::load_fixture("tiny");
    let params = DispatchParams::default();
    let outcome = Dispatcher::new(Arc::clone(&problem), params.clone())
        .unwrap()
        .run()
        .unwrap();

    let o5 = problem.order_idx("o5").unwrap();
    assert_eq!(outcome.unbinned, vec![o5]);
    assert!(outcome.unassigned.is_empty());

    for (order_id, schedule) in outcome.state.order_schedules() {
        let order = problem.order(order_id);
        if order_id == o5 {
            assert!(schedule.is_none());
            continue;
        }

        let schedule = schedule.unwrap();
        assert!(schedule.pickup_time >= order.ready_time());
        assert!(schedule.dropoff_time > schedule.pickup_time);
    }

    for assignment in outcome.state.assignments() {
        assert!(assignment.is_final());
        assert!(assignment.route().is_homogeneous(&problem));
    }

    let statistics = DispatchStatistics::from_outcome(&problem, &params, &outcome);
    assert_eq!(statistics.orders, 5);
    assert_eq!(statistics.binned_orders, 4);
    assert_eq!(statistics.delivered_orders, 4);
    assert_eq!(statistics.unassigned_orders, 1);
    assert_eq!(statistics.couriers_used, 2);
}

#[test]
fn test_dispatch_fixture_all_strategies() {
    let problem = test_utils::load_fixture("tiny");

    for matching in [MatchingStrategy::Greedy, MatchingStrategy::Optimal] {
        for commitment in [
            CommitmentStrategy::NoCommitment,
            CommitmentStrategy::ArrivalAndReady,
            CommitmentStrategy::ArrivalOrEarlyReady,
        ] {
            let params = DispatchParams {
                matching,
                commitment,
                unassigned_penalty: 100.0,
                ..DispatchParams::default()
            };
            let outcome = Dispatcher::new(Arc::clone(&problem), params)
                .unwrap()
                .run()
                .unwrap();

            let delivered = outcome
                .state
                .order_schedules()
                .filter(|(_, schedule)| schedule.is_some())
                .count();
            assert_eq!(delivered + outcome.unassigned.len() + outcome.unbinned.len(), 5);
        }
    }
}

#[test]
fn test_dispatch_is_deterministic() {
    let problem = test_utils::load_fixture("tiny");
    let run = |threads: Threads| {
        let params = DispatchParams {
            threads,
            ..DispatchParams::default()
        };
        let outcome = Dispatcher::new(Arc::clone(&problem), params.clone())
            .unwrap()
            .run()
            .unwrap();
        serde_json::to_string(&JsonDispatchResult::new(&problem, &params, &outcome)).unwrap()
    };

    assert_eq!(run(Threads::Single), run(Threads::Single));
    assert_eq!(run(Threads::Single), run(Threads::Multi(2)));
}

#[test]
fn test_improve_fixture_plan() {
    let problem = test_utils::load_fixture("tiny");
    let params = DispatchParams::default();
    let dispatcher = Dispatcher::new(Arc::clone(&problem), params.clone()).unwrap();
    let plan = dispatcher.plan_bundles();
    let order_count = plan.order_count();

    let improver = PlanImprover::new(
        Arc::clone(&problem),
        params.weights(),
        ImprovementParams {
            terminations: vec![Termination::Iterations(200)],
            seed: 7,
        },
    );
    let result = improver.improve(plan);

    assert_eq!(result.iterations, 200);
    assert!(result.cost <= result.initial_cost);
    assert_eq!(result.plan.order_count(), order_count);
}
