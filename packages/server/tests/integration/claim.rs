use common::{Actor, Permission, PermissionSet};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::json;
use server::entity::evaluation;

use crate::common::{TestApp, routes, token_for};

async fn placeholders(app: &TestApp, evaluator_id: i32) -> u64 {
    evaluation::Entity::find()
        .filter(evaluation::Column::EvaluatorId.eq(evaluator_id))
        .filter(evaluation::Column::IsComplete.eq(false))
        .count(&app.db)
        .await
        .expect("DB query failed")
}

mod claim_next {
    use super::*;

    #[tokio::test]
    async fn prefers_the_entry_with_fewest_completed_evaluations() {
        let app = TestApp::spawn().await;
        let contest = app.create_contest("Spring").await;
        let group = app.create_group("A").await;
        let (other, _) = app
            .create_evaluator("other", Some(group), &[Permission::JudgeEntries])
            .await;
        let (_, token) = app
            .create_evaluator("judge", Some(group), &[Permission::JudgeEntries])
            .await;
        let e1 = app.create_entry(contest, Some(group), None).await;
        let e2 = app.create_entry(contest, Some(group), None).await;
        // E2 already has one completed evaluation; E1 has none.
        app.complete_evaluation(e2, other, 5.0, None).await;

        assert_eq!(app.claim(&token).await, Some(e1));
    }

    #[tokio::test]
    async fn breaks_ties_by_ascending_entry_id() {
        let app = TestApp::spawn().await;
        let contest = app.create_contest("Spring").await;
        let group = app.create_group("A").await;
        let (other, _) = app
            .create_evaluator("other", Some(group), &[Permission::JudgeEntries])
            .await;
        let (_, token) = app
            .create_evaluator("judge", Some(group), &[Permission::JudgeEntries])
            .await;
        let e1 = app.create_entry(contest, Some(group), None).await;
        let e2 = app.create_entry(contest, Some(group), None).await;
        let e3 = app.create_entry(contest, Some(group), None).await;
        app.complete_evaluation(e1, other, 5.0, None).await;

        assert_eq!(app.claim(&token).await, Some(e2));
        let res = app.submit(&token, e2, 5.0, None).await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(app.claim(&token).await, Some(e3));
    }

    #[tokio::test]
    async fn returns_the_outstanding_claim_until_it_is_submitted() {
        let app = TestApp::spawn().await;
        let contest = app.create_contest("Spring").await;
        let group = app.create_group("A").await;
        let (judge, token) = app
            .create_evaluator("judge", Some(group), &[Permission::JudgeEntries])
            .await;
        let e1 = app.create_entry(contest, Some(group), None).await;
        let e2 = app.create_entry(contest, Some(group), None).await;

        assert_eq!(app.claim(&token).await, Some(e1));
        assert_eq!(app.claim(&token).await, Some(e1));
        assert_eq!(placeholders(&app, judge).await, 1);

        let res = app.submit(&token, e1, 7.5, None).await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["evaluation"]["total"], 30.0);
        assert_eq!(res.body["evaluation"]["is_complete"], true);

        assert_eq!(app.claim(&token).await, Some(e2));
    }

    #[tokio::test]
    async fn concurrent_claims_by_one_evaluator_share_a_placeholder() {
        let app = TestApp::spawn().await;
        let contest = app.create_contest("Spring").await;
        let group = app.create_group("A").await;
        let (judge, token) = app
            .create_evaluator("judge", Some(group), &[Permission::JudgeEntries])
            .await;
        let e1 = app.create_entry(contest, Some(group), None).await;
        app.create_entry(contest, Some(group), None).await;

        let (a, b, c, d) = tokio::join!(
            app.claim(&token),
            app.claim(&token),
            app.claim(&token),
            app.claim(&token),
        );

        assert_eq!([a, b, c, d], [Some(e1); 4]);
        assert_eq!(placeholders(&app, judge).await, 1);
    }

    #[tokio::test]
    async fn only_offers_eligible_entries_of_the_evaluators_group() {
        let app = TestApp::spawn().await;
        let contest = app.create_contest("Spring").await;
        let mine = app.create_group("A").await;
        let theirs = app.create_group("B").await;
        let (_, token) = app
            .create_evaluator("judge", Some(mine), &[Permission::JudgeEntries])
            .await;
        app.create_entry(contest, Some(theirs), None).await;
        let flagged = app.create_entry(contest, Some(mine), None).await;
        app.update_entry(flagged, |e| e.flagged = sea_orm::Set(true))
            .await;
        let eligible = app.create_entry(contest, Some(mine), None).await;

        assert_eq!(app.claim(&token).await, Some(eligible));
        let res = app.submit(&token, eligible, 5.0, None).await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(app.claim(&token).await, None);
    }

    #[tokio::test]
    async fn follows_the_current_contest_setting() {
        let app = TestApp::spawn().await;
        let (_, admin) = app.create_admin("admin").await;
        let older = app.create_contest("Spring").await;
        let newer = app.create_contest("Autumn").await;
        let group = app.create_group("A").await;
        let (_, token) = app
            .create_evaluator("judge", Some(group), &[Permission::JudgeEntries])
            .await;
        let old_entry = app.create_entry(older, Some(group), None).await;
        app.create_entry(newer, Some(group), None).await;

        let res = app
            .put_with_token(routes::CURRENT_CONTEST, &json!({"contest_id": older}), &admin)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["contest"]["id"], older);

        assert_eq!(app.claim(&token).await, Some(old_entry));
    }

    #[tokio::test]
    async fn nothing_to_judge_is_null() {
        let app = TestApp::spawn().await;
        let (_, token) = app
            .create_evaluator("judge", None, &[Permission::JudgeEntries])
            .await;

        assert_eq!(app.claim(&token).await, None);
    }

    #[tokio::test]
    async fn requires_judge_entries() {
        let app = TestApp::spawn().await;
        let contest = app.create_contest("Spring").await;
        app.create_entry(contest, None, None).await;
        let (_, token) = app
            .create_evaluator("viewer", None, &[Permission::ViewAdminStats])
            .await;

        let res = app.post_with_token(routes::CLAIM, &json!({}), &token).await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
    }

    #[tokio::test]
    async fn locked_account_is_denied_even_with_the_flag() {
        let app = TestApp::spawn().await;
        let contest = app.create_contest("Spring").await;
        app.create_entry(contest, None, None).await;
        let (id, _) = app
            .create_evaluator("judge", None, &[Permission::JudgeEntries])
            .await;
        let locked = token_for(&Actor {
            id,
            username: "judge".into(),
            is_admin: false,
            account_locked: true,
            permissions: PermissionSet::from_iter([Permission::JudgeEntries]),
        });

        let res = app.post_with_token(routes::CLAIM, &json!({}), &locked).await;

        assert_eq!(res.status, 403);
    }
}

mod release {
    use super::*;

    #[tokio::test]
    async fn drops_the_placeholder_and_frees_the_entry() {
        let app = TestApp::spawn().await;
        let contest = app.create_contest("Spring").await;
        let (judge, token) = app
            .create_evaluator("judge", None, &[Permission::JudgeEntries])
            .await;
        let e1 = app.create_entry(contest, None, None).await;

        assert_eq!(app.claim(&token).await, Some(e1));
        let res = app.delete_with_token(routes::CLAIM, &token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["entry_id"], e1);
        assert_eq!(placeholders(&app, judge).await, 0);
        assert_eq!(app.claim(&token).await, Some(e1));
    }

    #[tokio::test]
    async fn without_a_claim_is_null() {
        let app = TestApp::spawn().await;
        let (_, token) = app
            .create_evaluator("judge", None, &[Permission::JudgeEntries])
            .await;

        let res = app.delete_with_token(routes::CLAIM, &token).await;

        assert_eq!(res.status, 200);
        assert!(res.body["entry_id"].is_null());
    }
}

mod submit {
    use super::*;

    #[tokio::test]
    async fn rejects_scores_off_the_half_point_grid() {
        let app = TestApp::spawn().await;
        let contest = app.create_contest("Spring").await;
        let (_, token) = app
            .create_evaluator("judge", None, &[Permission::JudgeEntries])
            .await;
        let e1 = app.create_entry(contest, None, None).await;
        assert_eq!(app.claim(&token).await, Some(e1));

        let res = app.submit(&token, e1, 7.3, None).await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");

        let res = app.submit(&token, e1, 10.5, None).await;
        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn without_a_claim_is_not_found() {
        let app = TestApp::spawn().await;
        let contest = app.create_contest("Spring").await;
        let (_, token) = app
            .create_evaluator("judge", None, &[Permission::JudgeEntries])
            .await;
        let e1 = app.create_entry(contest, None, None).await;

        let res = app.submit(&token, e1, 5.0, None).await;

        assert_eq!(res.status, 404);
    }
}

mod edit {
    use super::*;

    #[tokio::test]
    async fn owner_can_edit_their_completed_evaluation() {
        let app = TestApp::spawn().await;
        let contest = app.create_contest("Spring").await;
        let (judge, token) = app
            .create_evaluator("judge", None, &[Permission::JudgeEntries])
            .await;
        let e1 = app.create_entry(contest, None, None).await;
        let id = app.complete_evaluation(e1, judge, 5.0, None).await;

        let res = app
            .patch_with_token(
                &routes::evaluation(id),
                &json!({
                    "creativity": 10.0,
                    "complexity": 9.5,
                    "execution": 9.0,
                    "interpretation": 8.5,
                    "skill_level": null,
                }),
                &token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["evaluation"]["total"], 37.0);
    }

    #[tokio::test]
    async fn others_need_edit_all_evaluations() {
        let app = TestApp::spawn().await;
        let contest = app.create_contest("Spring").await;
        let (owner, _) = app
            .create_evaluator("owner", None, &[Permission::JudgeEntries])
            .await;
        let (_, intruder) = app
            .create_evaluator("intruder", None, &[Permission::JudgeEntries])
            .await;
        let (_, editor) = app
            .create_evaluator("editor", None, &[Permission::EditAllEvaluations])
            .await;
        let e1 = app.create_entry(contest, None, None).await;
        let id = app.complete_evaluation(e1, owner, 5.0, None).await;
        let body = json!({
            "creativity": 1.0,
            "complexity": 1.0,
            "execution": 1.0,
            "interpretation": 1.0,
        });

        let res = app
            .patch_with_token(&routes::evaluation(id), &body, &intruder)
            .await;
        assert_eq!(res.status, 403);

        let res = app
            .patch_with_token(&routes::evaluation(id), &body, &editor)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["evaluation"]["total"], 4.0);
    }
}

mod review_level {
    use super::*;

    #[tokio::test]
    async fn admin_gets_newest_unlocked_entry() {
        let app = TestApp::spawn().await;
        let (_, admin) = app.create_admin("admin").await;
        let contest = app.create_contest("Spring").await;
        let older = app.create_entry(contest, None, None).await;
        let newest = app.create_entry(contest, None, None).await;
        app.update_entry(newest, |e| e.skill_level_locked = sea_orm::Set(true))
            .await;

        let res = app.get_with_token(routes::REVIEW_LEVEL, &admin).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["entry_id"], older);
    }

    #[tokio::test]
    async fn non_admin_is_forbidden() {
        let app = TestApp::spawn().await;
        let (_, token) = app
            .create_evaluator("judge", None, &[Permission::JudgeEntries])
            .await;

        let res = app.get_with_token(routes::REVIEW_LEVEL, &token).await;

        assert_eq!(res.status, 403);
    }
}
