use common::Permission;
use sea_orm::Set;
use serde_json::json;

use crate::common::{TestApp, routes};

mod evaluation_progress {
    use super::*;

    #[tokio::test]
    async fn total_is_entries_times_active_judges_per_group() {
        let app = TestApp::spawn().await;
        let (_, admin) = app.create_admin("admin").await;
        let contest = app.create_contest("Spring").await;
        let group = app.create_group("A").await;
        let (j1, _) = app
            .create_evaluator("j1", Some(group), &[Permission::JudgeEntries])
            .await;
        app.create_evaluator("j2", Some(group), &[Permission::JudgeEntries])
            .await;
        // Neither a locked account nor a member without the flag counts.
        let (locked, _) = app
            .create_evaluator("j3", Some(group), &[Permission::JudgeEntries])
            .await;
        let account = server::entity::evaluator::ActiveModel {
            id: Set(locked),
            account_locked: Set(true),
            ..Default::default()
        };
        sea_orm::ActiveModelTrait::update(account, &app.db)
            .await
            .expect("Failed to lock account");
        app.create_evaluator("viewer", Some(group), &[Permission::ViewAdminStats])
            .await;

        let entries = app.create_entries(contest, Some(group), 5).await;
        app.complete_evaluation(entries[0], j1, 5.0, None).await;

        let res = app
            .get_with_token(&routes::evaluation_progress(contest), &admin)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body, json!({"count": 1, "total": 10}));
    }

    #[tokio::test]
    async fn no_groups_means_nothing_to_evaluate() {
        let app = TestApp::spawn().await;
        let (_, admin) = app.create_admin("admin").await;
        let contest = app.create_contest("Spring").await;
        app.create_entries(contest, None, 3).await;

        let res = app
            .get_with_token(&routes::evaluation_progress(contest), &admin)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body, json!({"count": 0, "total": 0}));
    }

    #[tokio::test]
    async fn requires_view_admin_stats() {
        let app = TestApp::spawn().await;
        let contest = app.create_contest("Spring").await;
        let (_, token) = app
            .create_evaluator("judge", None, &[Permission::JudgeEntries])
            .await;

        let res = app
            .get_with_token(&routes::evaluation_progress(contest), &token)
            .await;

        assert_eq!(res.status, 403);
    }
}

mod entry_progress {
    use super::*;

    #[tokio::test]
    async fn counts_eligible_entries_with_a_completed_evaluation() {
        let app = TestApp::spawn().await;
        let (_, token) = app
            .create_evaluator("stats", None, &[Permission::ViewAdminStats])
            .await;
        let (judge, _) = app
            .create_evaluator("judge", None, &[Permission::JudgeEntries])
            .await;
        let contest = app.create_contest("Spring").await;
        let ids = app.create_entries(contest, None, 4).await;
        app.complete_evaluation(ids[0], judge, 5.0, None).await;
        app.complete_evaluation(ids[1], judge, 5.0, None).await;
        app.update_entry(ids[1], |e| e.flagged = Set(true)).await;

        let res = app
            .get_with_token(&routes::entry_progress(contest), &token)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body, json!({"count": 1, "total": 3}));
    }

    #[tokio::test]
    async fn unknown_contest_is_not_found() {
        let app = TestApp::spawn().await;
        let (_, admin) = app.create_admin("admin").await;

        let res = app.get_with_token(&routes::entry_progress(42), &admin).await;

        assert_eq!(res.status, 404);
    }
}

mod user_and_group_progress {
    use super::*;

    #[tokio::test]
    async fn judge_reads_own_and_group_progress() {
        let app = TestApp::spawn().await;
        let contest = app.create_contest("Spring").await;
        let group = app.create_group("A").await;
        let (j1, t1) = app
            .create_evaluator("j1", Some(group), &[Permission::JudgeEntries])
            .await;
        let (j2, _) = app
            .create_evaluator("j2", Some(group), &[Permission::JudgeEntries])
            .await;
        let ids = app.create_entries(contest, Some(group), 3).await;
        app.complete_evaluation(ids[0], j1, 5.0, None).await;
        app.complete_evaluation(ids[1], j1, 5.0, None).await;
        app.complete_evaluation(ids[0], j2, 5.0, None).await;

        let res = app
            .get_with_token(&routes::user_progress(contest, j1), &t1)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body, json!({"count": 2, "total": 3}));

        let res = app
            .get_with_token(&routes::group_progress(contest, group), &t1)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body, json!({"count": 3, "total": 6}));

        let res = app
            .get_with_token(&routes::user_progress(contest, j2), &t1)
            .await;
        assert_eq!(res.status, 403);
    }

    #[tokio::test]
    async fn evaluator_without_a_group_has_zero_progress() {
        let app = TestApp::spawn().await;
        let contest = app.create_contest("Spring").await;
        app.create_entries(contest, None, 2).await;
        let (id, token) = app
            .create_evaluator("loner", None, &[Permission::JudgeEntries])
            .await;

        let res = app
            .get_with_token(&routes::user_progress(contest, id), &token)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body, json!({"count": 0, "total": 0}));
    }
}

mod overview {
    use super::*;

    #[tokio::test]
    async fn admin_figures_are_hidden_from_judges() {
        let app = TestApp::spawn().await;
        let contest = app.create_contest("Spring").await;
        let group = app.create_group("A").await;
        let (judge, token) = app
            .create_evaluator("judge", Some(group), &[Permission::JudgeEntries])
            .await;
        let ids = app.create_entries(contest, Some(group), 2).await;
        app.complete_evaluation(ids[0], judge, 5.0, None).await;

        let res = app.get_with_token(routes::PROGRESS, &token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["contest_id"], contest);
        assert_eq!(res.body["user"], json!({"count": 1, "total": 2}));
        assert_eq!(res.body["group"], json!({"count": 1, "total": 2}));
        assert!(res.body["entries"].is_null());
        assert!(res.body["evaluators"].is_null());
    }

    #[tokio::test]
    async fn admin_sees_per_evaluator_rows() {
        let app = TestApp::spawn().await;
        let (_, admin) = app.create_admin("admin").await;
        let contest = app.create_contest("Spring").await;
        let group = app.create_group("A").await;
        let (judge, _) = app
            .create_evaluator("judge", Some(group), &[Permission::JudgeEntries])
            .await;
        let ids = app.create_entries(contest, Some(group), 4).await;
        app.complete_evaluation(ids[0], judge, 5.0, None).await;
        app.complete_evaluation(ids[1], judge, 5.0, None).await;

        let res = app.get_with_token(routes::PROGRESS, &admin).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["entries"], json!({"count": 2, "total": 4}));
        let rows = res.body["evaluators"].as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["evaluator_id"], judge);
        assert_eq!(rows[0]["count"], 2);
        assert_eq!(rows[0]["total"], 4);

        let res = app
            .get_with_token(&routes::evaluator_progress(contest), &admin)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn without_any_contest_is_not_found() {
        let app = TestApp::spawn().await;
        let (_, admin) = app.create_admin("admin").await;

        let res = app.get_with_token(routes::PROGRESS, &admin).await;

        assert_eq!(res.status, 404);
    }
}
