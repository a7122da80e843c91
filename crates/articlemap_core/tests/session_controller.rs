use articlemap_core::{
    Article, ArticleId, Completion, GatewayError, LoadError, LoadStatus, Operation,
    PendingRequest, RequestKind, Resolution, Response, SearchHits, SearchTrigger,
    SessionController, SessionFailure, TransitionError,
};

fn id(value: i64) -> ArticleId {
    ArticleId::from(value)
}

fn ids(values: &[i64]) -> Vec<ArticleId> {
    values.iter().copied().map(ArticleId::from).collect()
}

fn loaded_controller() -> SessionController {
    let mut controller = SessionController::new();
    controller
        .on_load_success(vec![
            Article::new(1, "Dog training", 0.0, 0.0),
            Article::new(2, "Cat nutrition", 1.0, 1.0),
            Article::new(3, "Bird migration", 2.0, 2.0),
        ])
        .unwrap();
    controller
}

fn remote_search(controller: &mut SessionController, query: &str) -> PendingRequest {
    controller.on_query_change(query);
    match controller.on_search_triggered() {
        SearchTrigger::Remote(request) => request,
        other => panic!("expected remote search, got {other:?}"),
    }
}

fn search_ok(request: &PendingRequest, result: &[i64]) -> Completion {
    Completion {
        ticket: request.ticket(),
        response: Response::Search(Ok(SearchHits::Ids(ids(result)))),
    }
}

fn similar_ok(request: &PendingRequest, result: &[i64]) -> Completion {
    Completion {
        ticket: request.ticket(),
        response: Response::Similar(Ok(ids(result))),
    }
}

fn assert_selection_valid(controller: &SessionController) {
    if let Some(selected) = controller.selected_id() {
        assert!(
            controller.view().contains(selected),
            "selection {selected} not in view"
        );
    }
}

#[test]
fn load_success_shows_all_with_no_selection() {
    let controller = loaded_controller();
    assert_eq!(controller.view().ids(), ids(&[1, 2, 3]));
    assert_eq!(controller.selected_id(), None);
    assert_eq!(controller.operation(), &Operation::ShowAll);
    assert_eq!(controller.load_status(), LoadStatus::Loaded);
}

#[test]
fn failed_load_shows_empty_map_with_load_error() {
    let mut controller = SessionController::new();
    let error = LoadError::Gateway(GatewayError::network("/raw-data", "unreachable"));
    controller.on_load_resolved(Err(error.clone())).unwrap_err();

    assert!(controller.view().is_empty());
    assert_eq!(controller.load_status(), LoadStatus::Failed);
    assert_eq!(controller.last_failure(), Some(&SessionFailure::Load(error)));
    assert!(controller.frame().error.is_some());
}

#[test]
fn query_change_does_not_recompute_view() {
    let mut controller = loaded_controller();
    controller.on_query_change("cat");
    assert_eq!(controller.query(), "cat");
    assert_eq!(controller.view().len(), 3);
    assert!(controller.in_flight().is_none());
}

#[test]
fn search_then_click_then_reset_scenario() {
    let mut controller = loaded_controller();

    let request = remote_search(&mut controller, "cat");
    assert_eq!(controller.in_flight(), Some(request.ticket()));
    let resolution = controller.apply(search_ok(&request, &[2]));
    assert_eq!(
        resolution,
        Resolution::Applied {
            kind: RequestKind::Search,
            shown: 1
        }
    );
    assert_eq!(controller.view().ids(), ids(&[2]));
    assert_eq!(controller.selected_id(), None);
    assert!(controller.in_flight().is_none());

    assert!(controller.on_point_clicked(&id(2)));
    assert_eq!(controller.selected_id(), Some(&id(2)));
    assert_eq!(controller.selected_article().unwrap().title, "Cat nutrition");

    controller.on_reset();
    assert_eq!(controller.view().ids(), ids(&[1, 2, 3]));
    assert_eq!(controller.selected_id(), None);
    assert_eq!(controller.query(), "");
    assert_eq!(controller.operation(), &Operation::Reset);
}

#[test]
fn stale_search_is_discarded_after_find_similar() {
    let mut controller = loaded_controller();

    let search = remote_search(&mut controller, "cat");
    let similar = controller.on_find_similar(&id(2)).unwrap();

    assert!(matches!(
        controller.apply(similar_ok(&similar, &[1, 3])),
        Resolution::Applied {
            kind: RequestKind::Similar,
            ..
        }
    ));
    assert_eq!(
        controller.apply(search_ok(&search, &[2])),
        Resolution::Discarded {
            kind: RequestKind::Search
        }
    );
    assert_eq!(controller.view().ids(), ids(&[1, 3]));
}

#[test]
fn older_search_arriving_late_never_overwrites_newer_search() {
    let mut controller = loaded_controller();

    let first = remote_search(&mut controller, "dog");
    let second = remote_search(&mut controller, "bird");

    controller.apply(search_ok(&second, &[3]));
    assert_eq!(
        controller.apply(search_ok(&first, &[1])),
        Resolution::Discarded {
            kind: RequestKind::Search
        }
    );
    assert_eq!(controller.view().ids(), ids(&[3]));
}

#[test]
fn superseded_search_arriving_first_is_also_discarded() {
    let mut controller = loaded_controller();

    let first = remote_search(&mut controller, "dog");
    let second = remote_search(&mut controller, "bird");

    assert!(matches!(
        controller.apply(search_ok(&first, &[1])),
        Resolution::Discarded { .. }
    ));
    assert_eq!(controller.view().len(), 3);
    assert_eq!(controller.in_flight(), Some(second.ticket()));
}

#[test]
fn reset_invalidates_in_flight_requests() {
    let mut controller = loaded_controller();
    let search = remote_search(&mut controller, "cat");
    controller.on_reset();

    assert!(controller.in_flight().is_none());
    assert!(matches!(
        controller.apply(search_ok(&search, &[2])),
        Resolution::Discarded { .. }
    ));
    assert_eq!(controller.view().len(), 3);
}

#[test]
fn completion_is_applied_at_most_once() {
    let mut controller = loaded_controller();
    let request = remote_search(&mut controller, "cat");

    controller.apply(search_ok(&request, &[2]));
    assert!(matches!(
        controller.apply(search_ok(&request, &[1, 2, 3])),
        Resolution::Discarded { .. }
    ));
    assert_eq!(controller.view().ids(), ids(&[2]));
}

#[test]
fn failed_search_keeps_previous_view_and_sets_error() {
    let mut controller = loaded_controller();
    let first = remote_search(&mut controller, "cat");
    controller.apply(search_ok(&first, &[2]));
    controller.on_point_clicked(&id(2));

    let second = remote_search(&mut controller, "dog");
    let error = GatewayError::Response {
        endpoint: "/search".to_string(),
        status: Some(500),
        message: "boom".to_string(),
    };
    let resolution = controller.apply(Completion {
        ticket: second.ticket(),
        response: Response::Search(Err(error.clone())),
    });

    assert_eq!(
        resolution,
        Resolution::Failed {
            kind: RequestKind::Search,
            error: error.clone()
        }
    );
    assert_eq!(controller.view().ids(), ids(&[2]));
    assert_eq!(controller.selected_id(), Some(&id(2)));
    assert!(controller.in_flight().is_none());
    assert_eq!(controller.last_failure(), Some(&SessionFailure::Search(error)));

    let third = remote_search(&mut controller, "bird");
    controller.apply(search_ok(&third, &[3]));
    assert!(controller.last_failure().is_none());
}

#[test]
fn failed_similar_keeps_operation() {
    let mut controller = loaded_controller();
    let similar = controller.on_find_similar(&id(1)).unwrap();
    controller.apply(Completion {
        ticket: similar.ticket(),
        response: Response::Similar(Err(GatewayError::network("/similar/1", "timeout"))),
    });

    assert_eq!(controller.operation(), &Operation::ShowAll);
    assert!(matches!(
        controller.last_failure(),
        Some(SessionFailure::Similar(_))
    ));
}

#[test]
fn find_similar_requires_id_in_view() {
    let mut controller = loaded_controller();
    let search = remote_search(&mut controller, "cat");
    controller.apply(search_ok(&search, &[2]));

    let before = controller.in_flight();
    assert_eq!(
        controller.on_find_similar(&id(1)).unwrap_err(),
        TransitionError::NotInView(id(1))
    );
    assert_eq!(controller.in_flight(), before);
}

#[test]
fn click_outside_view_is_a_no_op() {
    let mut controller = loaded_controller();
    controller.on_point_clicked(&id(3));

    assert!(!controller.on_point_clicked(&id(42)));
    assert_eq!(controller.selected_id(), Some(&id(3)));
}

#[test]
fn local_filter_revalidates_selection() {
    let mut controller = loaded_controller();
    controller.on_point_clicked(&id(2));

    controller.on_query_change("CAT");
    controller.on_local_filter();
    assert_eq!(controller.view().ids(), ids(&[2]));
    assert_eq!(controller.selected_id(), Some(&id(2)));

    controller.on_query_change("bird");
    controller.on_local_filter();
    assert_eq!(controller.view().ids(), ids(&[3]));
    assert_eq!(controller.selected_id(), None);
}

#[test]
fn blank_query_shows_all_without_remote_call() {
    let mut controller = loaded_controller();
    let request = remote_search(&mut controller, "cat");
    controller.apply(search_ok(&request, &[2]));
    controller.on_point_clicked(&id(2));

    controller.on_query_change("   ");
    assert_eq!(controller.on_search_triggered(), SearchTrigger::ShowAll);
    assert_eq!(controller.view().len(), 3);
    assert_eq!(controller.selected_id(), None);
    assert!(controller.in_flight().is_none());
}

#[test]
fn blank_search_invalidates_in_flight_search() {
    let mut controller = loaded_controller();
    let stale = remote_search(&mut controller, "cat");

    controller.on_query_change("  ");
    assert_eq!(controller.on_search_triggered(), SearchTrigger::ShowAll);
    assert!(controller.in_flight().is_none());

    let resolution = controller.apply(search_ok(&stale, &[2]));
    assert_eq!(
        resolution,
        Resolution::Discarded {
            kind: RequestKind::Search
        }
    );
    assert_eq!(controller.view().ids(), ids(&[1, 2, 3]));
    assert_eq!(controller.operation(), &Operation::ShowAll);
}

#[test]
fn local_filter_invalidates_in_flight_search() {
    let mut controller = loaded_controller();
    let stale = remote_search(&mut controller, "cat");

    controller.on_local_filter();
    assert!(controller.in_flight().is_none());
    assert_eq!(controller.view().ids(), ids(&[2]));

    let resolution = controller.apply(search_ok(&stale, &[1, 3]));
    assert_eq!(
        resolution,
        Resolution::Discarded {
            kind: RequestKind::Search
        }
    );
    assert_eq!(controller.view().ids(), ids(&[2]));
    assert_eq!(controller.operation().kind(), "local_filter");
}

#[test]
fn ids_beyond_i64_load_as_distinct_articles() {
    let decoded = articlemap_core::gateway::wire::decode_articles(
        r#"[
            {"id": 9223372036854775808, "title": "first", "x": 0, "y": 0},
            {"id": 9223372036854775809, "title": "second", "x": 1, "y": 1}
        ]"#,
    )
    .unwrap();
    let mut controller = SessionController::new();

    assert_eq!(controller.on_load_resolved(Ok(decoded)).unwrap(), 2);
    assert_eq!(
        controller.view().ids(),
        vec![
            ArticleId::new("9223372036854775808"),
            ArticleId::new("9223372036854775809")
        ]
    );
}

#[test]
fn legacy_label_results_are_matched_locally() {
    let mut controller = loaded_controller();
    let request = remote_search(&mut controller, "pets");
    controller.apply(Completion {
        ticket: request.ticket(),
        response: Response::Search(Ok(SearchHits::Labels(vec![
            "dog".to_string(),
            "NUTRITION".to_string(),
        ]))),
    });

    assert_eq!(controller.view().ids(), ids(&[1, 2]));
}

#[test]
fn mismatched_response_kind_is_discarded() {
    let mut controller = loaded_controller();
    let request = remote_search(&mut controller, "cat");
    let resolution = controller.apply(Completion {
        ticket: request.ticket(),
        response: Response::Similar(Ok(ids(&[1]))),
    });

    assert!(matches!(resolution, Resolution::Discarded { .. }));
    assert_eq!(controller.in_flight(), Some(request.ticket()));
}

#[test]
fn reset_returns_snapshot_after_many_operations() {
    let mut controller = loaded_controller();
    let snapshot = controller.repository().snapshot().clone();

    for round in 0..5 {
        let search = remote_search(&mut controller, "q");
        controller.apply(search_ok(&search, &[(round % 3) + 1]));
        let target = controller.view().ids()[0].clone();
        controller.on_point_clicked(&target);
        let similar = controller.on_find_similar(&target).unwrap();
        controller.apply(similar_ok(&similar, &[1, 3]));
        controller.on_local_filter();
    }
    controller.on_reset();

    assert_eq!(controller.view(), snapshot);
}

#[test]
fn selection_invariant_holds_after_every_transition() {
    let mut controller = loaded_controller();
    assert_selection_valid(&controller);

    controller.on_point_clicked(&id(1));
    assert_selection_valid(&controller);

    let search = remote_search(&mut controller, "x");
    assert_selection_valid(&controller);
    controller.apply(search_ok(&search, &[2, 3]));
    assert_selection_valid(&controller);

    controller.on_point_clicked(&id(3));
    let similar = controller.on_find_similar(&id(3)).unwrap();
    controller.apply(similar_ok(&similar, &[999]));
    assert!(controller.view().is_empty());
    assert_selection_valid(&controller);

    controller.on_reset();
    assert_selection_valid(&controller);
}

#[test]
fn frame_reflects_selection_and_busy_state() {
    let mut controller = loaded_controller();
    controller.on_point_clicked(&id(1));
    let _pending = remote_search(&mut controller, "bird");

    let frame = controller.frame();
    assert_eq!(frame.points.len(), 3);
    assert_eq!(frame.busy, Some(RequestKind::Search));
    assert_eq!(frame.query, "bird");
    let selected_points = frame
        .points
        .iter()
        .filter(|point| point.selected)
        .map(|point| point.id.clone())
        .collect::<Vec<_>>();
    assert_eq!(selected_points, vec![id(1)]);
    assert_eq!(frame.selected.unwrap().id, id(1));
    assert_eq!(frame.points[2].label, "Bird migration");
}
