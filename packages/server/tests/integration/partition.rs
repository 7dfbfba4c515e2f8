use common::Permission;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde_json::json;
use server::entity::entry;

use crate::common::{TestApp, routes};

/// `(entry_id, assigned_group_id)` pairs of a contest, by entry id.
async fn assignments(app: &TestApp, contest_id: i32) -> Vec<(i32, Option<i32>)> {
    entry::Entity::find()
        .filter(entry::Column::ContestId.eq(contest_id))
        .order_by_asc(entry::Column::Id)
        .all(&app.db)
        .await
        .expect("DB query failed")
        .into_iter()
        .map(|e| (e.id, e.assigned_group_id))
        .collect()
}

mod assign_all {
    use super::*;

    #[tokio::test]
    async fn splits_ten_entries_into_contiguous_blocks_of_four_three_three() {
        let app = TestApp::spawn().await;
        let (_, token) = app
            .create_evaluator("coordinator", None, &[Permission::AssignEntryGroups])
            .await;
        let contest = app.create_contest("Spring").await;
        let g1 = app.create_group("A").await;
        let g2 = app.create_group("B").await;
        let g3 = app.create_group("C").await;
        let ids = app.create_entries(contest, None, 10).await;

        let res = app
            .post_with_token(&routes::assign_all(contest), &json!({}), &token)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["assigned"], 10);
        let sizes: Vec<i64> = res.body["groups"]
            .as_array()
            .unwrap()
            .iter()
            .map(|g| g["entry_count"].as_i64().unwrap())
            .collect();
        assert_eq!(sizes, vec![4, 3, 3]);

        let expected: Vec<(i32, Option<i32>)> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| {
                let group = match i {
                    0..=3 => g1,
                    4..=6 => g2,
                    _ => g3,
                };
                (*id, Some(group))
            })
            .collect();
        assert_eq!(assignments(&app, contest).await, expected);
    }

    #[tokio::test]
    async fn skips_inactive_groups_and_disqualified_entries() {
        let app = TestApp::spawn().await;
        let (_, admin) = app.create_admin("admin").await;
        let contest = app.create_contest("Spring").await;
        let active = app.create_group("A").await;
        let inactive = app.create_group("B").await;
        let res = app
            .patch_with_token(&routes::group(inactive), &json!({"is_active": false}), &admin)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);

        let kept = app.create_entry(contest, None, None).await;
        let dq = app.create_entry(contest, Some(inactive), None).await;
        app.update_entry(dq, |e| e.disqualified = sea_orm::Set(true))
            .await;

        let res = app
            .post_with_token(&routes::assign_all(contest), &json!({}), &admin)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["assigned"], 1);
        assert_eq!(app.find_entry(kept).await.assigned_group_id, Some(active));
        assert_eq!(app.find_entry(dq).await.assigned_group_id, Some(inactive));
    }

    #[tokio::test]
    async fn requires_assign_entry_groups() {
        let app = TestApp::spawn().await;
        let (_, token) = app
            .create_evaluator("judge", None, &[Permission::JudgeEntries])
            .await;
        let contest = app.create_contest("Spring").await;
        app.create_group("A").await;

        let res = app
            .post_with_token(&routes::assign_all(contest), &json!({}), &token)
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
    }

    #[tokio::test]
    async fn running_twice_gives_the_same_assignment() {
        let app = TestApp::spawn().await;
        let (_, admin) = app.create_admin("admin").await;
        let contest = app.create_contest("Spring").await;
        app.create_group("A").await;
        app.create_group("B").await;
        app.create_entries(contest, None, 7).await;

        let res = app
            .post_with_token(&routes::assign_all(contest), &json!({}), &admin)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        let first = assignments(&app, contest).await;

        let res = app
            .post_with_token(&routes::assign_all(contest), &json!({}), &admin)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(assignments(&app, contest).await, first);
    }

    #[tokio::test]
    async fn no_active_groups_is_an_internal_error() {
        let app = TestApp::spawn().await;
        let (_, admin) = app.create_admin("admin").await;
        let contest = app.create_contest("Spring").await;
        app.create_entries(contest, None, 3).await;

        let res = app
            .post_with_token(&routes::assign_all(contest), &json!({}), &admin)
            .await;

        assert_eq!(res.status, 500);
        assert_eq!(res.body["code"], "INTERNAL_ERROR");
        assert!(
            assignments(&app, contest)
                .await
                .iter()
                .all(|(_, group)| group.is_none())
        );
    }

    #[tokio::test]
    async fn unknown_contest_is_not_found() {
        let app = TestApp::spawn().await;
        let (_, admin) = app.create_admin("admin").await;
        app.create_group("A").await;

        let res = app
            .post_with_token(&routes::assign_all(999), &json!({}), &admin)
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn unauthenticated_request_is_rejected() {
        let app = TestApp::spawn().await;
        let contest = app.create_contest("Spring").await;

        let res = app
            .post_without_token(&routes::assign_all(contest), &json!({}))
            .await;

        assert_eq!(res.status, 401);
    }
}

mod assign_new {
    use super::*;

    #[tokio::test]
    async fn only_touches_unassigned_entries() {
        let app = TestApp::spawn().await;
        let (_, admin) = app.create_admin("admin").await;
        let contest = app.create_contest("Spring").await;
        let g1 = app.create_group("A").await;
        let g2 = app.create_group("B").await;
        let placed = app.create_entries(contest, Some(g1), 3).await;
        let fresh = app.create_entries(contest, None, 2).await;

        let res = app
            .post_with_token(&routes::assign_new(contest), &json!({}), &admin)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["assigned"], 2);
        for id in placed {
            assert_eq!(app.find_entry(id).await.assigned_group_id, Some(g1));
        }
        assert_eq!(app.find_entry(fresh[0]).await.assigned_group_id, Some(g1));
        assert_eq!(app.find_entry(fresh[1]).await.assigned_group_id, Some(g2));
    }
}

mod transfer {
    use super::*;

    #[tokio::test]
    async fn moves_every_entry_of_the_source_group() {
        let app = TestApp::spawn().await;
        let (_, admin) = app.create_admin("admin").await;
        let contest = app.create_contest("Spring").await;
        let other = app.create_contest("Autumn").await;
        let from = app.create_group("A").await;
        let to = app.create_group("B").await;
        let moved = app.create_entries(contest, Some(from), 3).await;
        let untouched = app.create_entry(other, Some(from), None).await;

        let res = app
            .post_with_token(
                &routes::transfer(contest),
                &json!({"from_group_id": from, "to_group_id": to}),
                &admin,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["moved"], 3);
        for id in moved {
            assert_eq!(app.find_entry(id).await.assigned_group_id, Some(to));
        }
        assert_eq!(app.find_entry(untouched).await.assigned_group_id, Some(from));
    }

    #[tokio::test]
    async fn unknown_target_group_is_not_found() {
        let app = TestApp::spawn().await;
        let (_, admin) = app.create_admin("admin").await;
        let contest = app.create_contest("Spring").await;
        let from = app.create_group("A").await;

        let res = app
            .post_with_token(
                &routes::transfer(contest),
                &json!({"from_group_id": from, "to_group_id": 999}),
                &admin,
            )
            .await;

        assert_eq!(res.status, 404);
    }
}
