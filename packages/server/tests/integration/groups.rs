use common::Permission;
use serde_json::json;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn manager_creates_renames_and_deactivates_a_group() {
    let app = TestApp::spawn().await;
    let (_, token) = app
        .create_evaluator("manager", None, &[Permission::ManageJudgingGroups])
        .await;

    let res = app
        .post_with_token(routes::GROUPS, &json!({"name": "  Alpha  "}), &token)
        .await;
    assert_eq!(res.status, 201, "{}", res.text);
    assert_eq!(res.body["name"], "Alpha");
    assert_eq!(res.body["is_active"], true);
    let id = res.body["id"].as_i64().unwrap() as i32;

    let res = app
        .patch_with_token(
            &routes::group(id),
            &json!({"name": "Beta", "is_active": false}),
            &token,
        )
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["name"], "Beta");
    assert_eq!(res.body["is_active"], false);

    let res = app.get_with_token(routes::GROUPS, &token).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn empty_update_is_rejected() {
    let app = TestApp::spawn().await;
    let (_, admin) = app.create_admin("admin").await;
    let group = app.create_group("A").await;

    let res = app
        .patch_with_token(&routes::group(group), &json!({}), &admin)
        .await;

    assert_eq!(res.status, 400);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn creating_a_group_requires_manage_judging_groups() {
    let app = TestApp::spawn().await;
    let (_, token) = app
        .create_evaluator("judge", None, &[Permission::JudgeEntries])
        .await;

    let res = app
        .post_with_token(routes::GROUPS, &json!({"name": "Alpha"}), &token)
        .await;

    assert_eq!(res.status, 403);
}

#[tokio::test]
async fn evaluators_are_moved_between_groups() {
    let app = TestApp::spawn().await;
    let (_, token) = app
        .create_evaluator("lead", None, &[Permission::AssignEvaluatorGroups])
        .await;
    let group = app.create_group("A").await;
    let (judge, _) = app
        .create_evaluator("judge", None, &[Permission::JudgeEntries])
        .await;

    let res = app
        .put_with_token(&routes::evaluator_group(judge), &json!({"group_id": group}), &token)
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["group_id"], group);

    let res = app
        .put_with_token(&routes::evaluator_group(judge), &json!({"group_id": null}), &token)
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert!(res.body["group_id"].is_null());

    let res = app
        .put_with_token(&routes::evaluator_group(judge), &json!({"group_id": 999}), &token)
        .await;
    assert_eq!(res.status, 404);
}

#[tokio::test]
async fn current_contest_falls_back_to_the_latest() {
    let app = TestApp::spawn().await;
    let (_, admin) = app.create_admin("admin").await;
    app.create_contest("Spring").await;
    let latest = app.create_contest("Autumn").await;

    let res = app.get_with_token(routes::CURRENT_CONTEST, &admin).await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["contest"]["id"], latest);

    let res = app
        .put_with_token(routes::CURRENT_CONTEST, &json!({"contest_id": 77}), &admin)
        .await;
    assert_eq!(res.status, 404);
}
