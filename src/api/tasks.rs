use crate::domain::list::driven_ports::ListReader;
use crate::domain::task;
use crate::domain::task::driven_ports::{TaskReader, TaskWriter};
use crate::domain::task::driving_ports::{CreateItemError, TaskPort, UpdateItemError};
use crate::external_connections::ExternalConnectivity;
use crate::routing_utils::{GenericErrorResponse, flash_redirect, take_flash};
use crate::session::CurrentUser;
use crate::{AppState, SharedData, dto, persistence};
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Extension, Form, Json, Router};
use axum_extra::extract::CookieJar;
use std::sync::Arc;
use tracing::{error, info};
use validator::Validate;

/// Routes for viewing and managing to-do items. Everything here sits behind
/// the login gate, so the [CurrentUser] extension is always present.
pub fn task_routes() -> Router<Arc<SharedData>> {
    Router::new()
        .route(
            "/",
            get(
                |State(app_data): AppState,
                 Extension(current_user): Extension<CurrentUser>,
                 jar: CookieJar| async move {
                    let mut ext_cxn = app_data.ext_cxn.clone();

                    render_index(
                        &current_user,
                        jar,
                        &mut ext_cxn,
                        &task::TaskService {},
                        &persistence::db_task_driven_ports::DbTaskReader {},
                    )
                    .await
                },
            ),
        )
        .route(
            "/create/",
            get(
                |State(app_data): AppState, jar: CookieJar| async move {
                    let mut ext_cxn = app_data.ext_cxn.clone();

                    render_create_form(
                        jar,
                        &mut ext_cxn,
                        &persistence::db_list_driven_ports::DbReadLists {},
                    )
                    .await
                },
            )
            .post(
                |State(app_data): AppState,
                 Extension(current_user): Extension<CurrentUser>,
                 jar: CookieJar,
                 Form(form): Form<dto::NewItemForm>| async move {
                    let mut ext_cxn = app_data.ext_cxn.clone();

                    create_item(
                        &current_user,
                        jar,
                        form,
                        &mut ext_cxn,
                        &task::TaskService {},
                        &persistence::db_list_driven_ports::DbReadLists {},
                        &persistence::db_task_driven_ports::DbTaskWriter {},
                    )
                    .await
                },
            ),
        )
        .route(
            "/delete/:task_id",
            get(
                |State(app_data): AppState,
                 Extension(current_user): Extension<CurrentUser>,
                 Path(task_id): Path<i32>| async move {
                    let mut ext_cxn = app_data.ext_cxn.clone();

                    delete_item(
                        &current_user,
                        task_id,
                        &mut ext_cxn,
                        &task::TaskService {},
                        &persistence::db_task_driven_ports::DbTaskWriter {},
                    )
                    .await
                },
            ),
        )
        .route(
            "/edit/:task_id",
            get(
                |State(app_data): AppState,
                 Extension(current_user): Extension<CurrentUser>,
                 jar: CookieJar,
                 Path(task_id): Path<i32>| async move {
                    let mut ext_cxn = app_data.ext_cxn.clone();

                    render_edit_form(
                        &current_user,
                        task_id,
                        jar,
                        &mut ext_cxn,
                        &task::TaskService {},
                        &persistence::db_task_driven_ports::DbTaskReader {},
                    )
                    .await
                },
            )
            .post(
                |State(app_data): AppState,
                 Extension(current_user): Extension<CurrentUser>,
                 jar: CookieJar,
                 Path(task_id): Path<i32>,
                 Form(form): Form<dto::EditItemForm>| async move {
                    let mut ext_cxn = app_data.ext_cxn.clone();

                    update_item(
                        &current_user,
                        task_id,
                        jar,
                        form,
                        &mut ext_cxn,
                        &task::TaskService {},
                        &persistence::db_task_driven_ports::DbTaskWriter {},
                    )
                    .await
                },
            ),
        )
}

/// The home view: the acting user's items grouped by list title, plus any
/// pending flash message
async fn render_index(
    current_user: &CurrentUser,
    jar: CookieJar,
    ext_cxn: &mut impl ExternalConnectivity,
    task_service: &impl TaskPort,
    task_read: &impl TaskReader,
) -> Result<(CookieJar, Json<dto::IndexView>), GenericErrorResponse> {
    info!("Rendering the home view for user {}", current_user.id);
    let (jar, flash) = take_flash(jar);
    let groups = task_service
        .grouped_items_for_user(current_user.id, ext_cxn, task_read)
        .await
        .map_err(|err| {
            error!("Could not list items: {err}");
            GenericErrorResponse(err)
        })?;

    Ok((
        jar,
        Json(dto::IndexView {
            flash,
            username: current_user.username.clone(),
            groups: groups.into_iter().map(dto::TaskGroupView::from).collect(),
        }),
    ))
}

/// The create form view: the titles a new item can be filed under
async fn render_create_form(
    jar: CookieJar,
    ext_cxn: &mut impl ExternalConnectivity,
    list_read: &impl ListReader,
) -> Result<(CookieJar, Json<dto::CreateView>), GenericErrorResponse> {
    let (jar, flash) = take_flash(jar);
    let list_titles = list_read.all_titles(ext_cxn).await.map_err(|err| {
        error!("Could not fetch list titles: {err}");
        GenericErrorResponse(err)
    })?;

    Ok((jar, Json(dto::CreateView { flash, list_titles })))
}

/// Files a new item under the list named in the form
async fn create_item(
    current_user: &CurrentUser,
    jar: CookieJar,
    form: dto::NewItemForm,
    ext_cxn: &mut impl ExternalConnectivity,
    task_service: &impl TaskPort,
    list_read: &impl ListReader,
    task_write: &impl TaskWriter,
) -> Response {
    if form.validate().is_err() {
        return flash_redirect(jar, "Content is required!", "/").into_response();
    }

    info!("User {} is creating an item", current_user.id);
    let new_item = task::NewItem {
        content: form.content,
        due_date: form.due_date,
        list_title: form.list,
    };
    let create_result = task_service
        .create_item(current_user.id, &new_item, ext_cxn, list_read, task_write)
        .await;

    match create_result {
        Ok(_) => (jar, Redirect::to("/")).into_response(),
        Err(CreateItemError::UnknownList(title)) => {
            let message = format!("No list is titled \"{title}\".");
            flash_redirect(jar, &message, "/create/").into_response()
        }
        Err(CreateItemError::PortError(err)) => {
            error!("Could not create an item: {err}");
            GenericErrorResponse(err).into_response()
        }
    }
}

/// Removes an item the user owns. A missing or non-owned id changes nothing
/// and redirects home all the same.
async fn delete_item(
    current_user: &CurrentUser,
    task_id: i32,
    ext_cxn: &mut impl ExternalConnectivity,
    task_service: &impl TaskPort,
    task_write: &impl TaskWriter,
) -> Response {
    info!("User {} is deleting item {}", current_user.id, task_id);
    let delete_result = task_service
        .delete_item(task_id, current_user.id, ext_cxn, task_write)
        .await;

    match delete_result {
        Ok(()) => Redirect::to("/").into_response(),
        Err(err) => {
            error!("Could not delete item {task_id}: {err}");
            GenericErrorResponse(err).into_response()
        }
    }
}

/// The edit form view for an item the user owns
async fn render_edit_form(
    current_user: &CurrentUser,
    task_id: i32,
    jar: CookieJar,
    ext_cxn: &mut impl ExternalConnectivity,
    task_service: &impl TaskPort,
    task_read: &impl TaskReader,
) -> Response {
    let (jar, flash) = take_flash(jar);
    let fetch_result = task_service
        .item_for_edit(task_id, current_user.id, ext_cxn, task_read)
        .await;

    match fetch_result {
        Ok(Some(item)) => (
            jar,
            Json(dto::EditView {
                flash,
                task: dto::TodoItemView::from(item),
            }),
        )
            .into_response(),
        Ok(None) => flash_redirect(jar, "Task not found or not authorized.", "/").into_response(),
        Err(err) => {
            error!("Could not fetch item {task_id} for editing: {err}");
            GenericErrorResponse(err).into_response()
        }
    }
}

/// Rewrites the content of an item the user owns
async fn update_item(
    current_user: &CurrentUser,
    task_id: i32,
    jar: CookieJar,
    form: dto::EditItemForm,
    ext_cxn: &mut impl ExternalConnectivity,
    task_service: &impl TaskPort,
    task_write: &impl TaskWriter,
) -> Response {
    if form.validate().is_err() {
        return flash_redirect(jar, "Content is required!", "/").into_response();
    }

    info!("User {} is updating item {}", current_user.id, task_id);
    let update_result = task_service
        .update_item_content(task_id, current_user.id, &form.content, ext_cxn, task_write)
        .await;

    match update_result {
        Ok(()) => (jar, Redirect::to("/")).into_response(),
        Err(UpdateItemError::NotFoundOrNotOwned) => {
            flash_redirect(jar, "Task not found or not authorized.", "/").into_response()
        }
        Err(UpdateItemError::PortError(err)) => {
            error!("Could not update item {task_id}: {err}");
            GenericErrorResponse(err).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_util::{flash_message_of, location_of};
    use crate::domain::task::test_util::{InMemoryTaskPersistence, MockTaskService};
    use crate::domain::task::{TaskGroup, TodoItem};
    use crate::domain::list::test_util::InMemoryListPersistence;
    use crate::external_connections::test_util::FakeExternalConnectivity;
    use crate::routing_utils::FLASH_COOKIE;
    use anyhow::anyhow;
    use axum::http::StatusCode;
    use axum_extra::extract::cookie::Cookie;
    use speculoos::prelude::*;

    fn user() -> CurrentUser {
        CurrentUser {
            id: 1,
            username: "alice".to_owned(),
        }
    }

    fn jar_with_flash(message: &str) -> CookieJar {
        CookieJar::new().add(Cookie::build((FLASH_COOKIE, message.to_owned())).path("/").build())
    }

    mod render_index {
        use super::*;

        #[tokio::test]
        async fn groups_come_back_and_the_flash_is_consumed() {
            let mut ext_cxn = FakeExternalConnectivity::new();
            let task_service = MockTaskService::new_locked();
            task_service
                .lock()
                .unwrap()
                .grouped_items_for_user_result
                .set_returned_anyhow(Ok(vec![TaskGroup {
                    list_title: "Home".to_owned(),
                    items: vec![TodoItem {
                        id: 4,
                        content: "Buy milk".to_owned(),
                        due_date: None,
                    }],
                }]));
            let dummy_reader = InMemoryTaskPersistence::new_locked();

            let view_result = render_index(
                &user(),
                jar_with_flash("Content is required!"),
                &mut ext_cxn,
                &task_service,
                &dummy_reader,
            )
            .await;

            let (jar, Json(view)) = view_result.expect("the home view should render");
            assert_that!(view.flash)
                .is_some()
                .is_equal_to("Content is required!".to_owned());
            assert_that!(view.username).is_equal_to("alice".to_owned());
            assert_that!(view.groups).has_length(1);
            assert_that!(view.groups[0].items[0].content).is_equal_to("Buy milk".to_owned());
            // Consumed, not re-rendered
            assert_that!(jar.get(FLASH_COOKIE).map(|cookie| cookie.value().to_owned()))
                .is_none();

            let locked_service = task_service.lock().unwrap();
            assert_that!(locked_service.grouped_items_for_user_result.calls())
                .is_equal_to(&[1][..]);
        }

        #[tokio::test]
        async fn a_port_failure_becomes_a_500() {
            let mut ext_cxn = FakeExternalConnectivity::new();
            let task_service = MockTaskService::new_locked();
            task_service
                .lock()
                .unwrap()
                .grouped_items_for_user_result
                .set_returned_anyhow(Err(anyhow!("the database is on fire")));
            let dummy_reader = InMemoryTaskPersistence::new_locked();

            let view_result = render_index(
                &user(),
                CookieJar::new(),
                &mut ext_cxn,
                &task_service,
                &dummy_reader,
            )
            .await;

            let Err(error_response) = view_result else {
                panic!("Expected the port failure to surface");
            };
            let response = error_response.into_response();
            assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, response.status());
        }
    }

    mod render_create_form {
        use super::*;

        #[tokio::test]
        async fn lists_every_title() {
            let mut ext_cxn = FakeExternalConnectivity::new();
            let list_read =
                InMemoryListPersistence::new_locked_with_titles(&["Work", "Home", "Study"]);

            let view_result = render_create_form(CookieJar::new(), &mut ext_cxn, &list_read).await;

            let (_, Json(view)) = view_result.expect("the create view should render");
            assert_that!(view.flash).is_none();
            assert_that!(view.list_titles).is_equal_to(vec![
                "Home".to_owned(),
                "Study".to_owned(),
                "Work".to_owned(),
            ]);
        }
    }

    mod create_item {
        use super::*;

        fn form(content: &str, list: &str) -> dto::NewItemForm {
            dto::NewItemForm {
                content: content.to_owned(),
                due_date: None,
                list: list.to_owned(),
            }
        }

        #[tokio::test]
        async fn happy_path_redirects_home() {
            let mut ext_cxn = FakeExternalConnectivity::new();
            let task_service = MockTaskService::new_locked();
            task_service
                .lock()
                .unwrap()
                .create_item_result
                .set_returned_result(Ok(6));
            let list_read = InMemoryListPersistence::new_locked_with_titles(&["Home"]);
            let task_write = InMemoryTaskPersistence::new_locked();

            let response = create_item(
                &user(),
                CookieJar::new(),
                form("Buy milk", "Home"),
                &mut ext_cxn,
                &task_service,
                &list_read,
                &task_write,
            )
            .await;

            assert_eq!(StatusCode::SEE_OTHER, response.status());
            assert_that!(location_of(&response)).is_equal_to("/".to_owned());

            let locked_service = task_service.lock().unwrap();
            let (calling_user, created_item) = &locked_service.create_item_result.calls()[0];
            assert_that!(*calling_user).is_equal_to(1);
            assert_that!(created_item.content).is_equal_to("Buy milk".to_owned());
            assert_that!(created_item.list_title).is_equal_to("Home".to_owned());
        }

        #[tokio::test]
        async fn empty_content_flashes_without_touching_the_service() {
            let mut ext_cxn = FakeExternalConnectivity::new();
            let task_service = MockTaskService::new_locked();
            let list_read = InMemoryListPersistence::new_locked_with_titles(&["Home"]);
            let task_write = InMemoryTaskPersistence::new_locked();

            let response = create_item(
                &user(),
                CookieJar::new(),
                form("", "Home"),
                &mut ext_cxn,
                &task_service,
                &list_read,
                &task_write,
            )
            .await;

            assert_eq!(StatusCode::SEE_OTHER, response.status());
            assert_that!(location_of(&response)).is_equal_to("/".to_owned());
            assert_that!(flash_message_of(&response))
                .is_some()
                .is_equal_to("Content is required!".to_owned());

            let locked_service = task_service.lock().unwrap();
            assert!(locked_service.create_item_result.calls().is_empty());
        }

        #[tokio::test]
        async fn an_unknown_list_title_flashes_back_to_the_form() {
            let mut ext_cxn = FakeExternalConnectivity::new();
            let task_service = MockTaskService::new_locked();
            task_service
                .lock()
                .unwrap()
                .create_item_result
                .set_returned_result(Err(CreateItemError::UnknownList("Errands".to_owned())));
            let list_read = InMemoryListPersistence::new_locked_with_titles(&["Home"]);
            let task_write = InMemoryTaskPersistence::new_locked();

            let response = create_item(
                &user(),
                CookieJar::new(),
                form("Buy milk", "Errands"),
                &mut ext_cxn,
                &task_service,
                &list_read,
                &task_write,
            )
            .await;

            assert_eq!(StatusCode::SEE_OTHER, response.status());
            assert_that!(location_of(&response)).is_equal_to("/create/".to_owned());
            assert_that!(flash_message_of(&response))
                .is_some()
                .is_equal_to("No list is titled \"Errands\".".to_owned());
        }
    }

    mod delete_item {
        use super::*;

        #[tokio::test]
        async fn always_redirects_home() {
            let mut ext_cxn = FakeExternalConnectivity::new();
            let task_service = MockTaskService::new_locked();
            task_service
                .lock()
                .unwrap()
                .delete_item_result
                .set_returned_anyhow(Ok(()));
            let task_write = InMemoryTaskPersistence::new_locked();

            let response =
                delete_item(&user(), 42, &mut ext_cxn, &task_service, &task_write).await;

            assert_eq!(StatusCode::SEE_OTHER, response.status());
            assert_that!(location_of(&response)).is_equal_to("/".to_owned());

            let locked_service = task_service.lock().unwrap();
            assert_that!(locked_service.delete_item_result.calls())
                .is_equal_to(&[(42, 1)][..]);
        }
    }

    mod render_edit_form {
        use super::*;

        #[tokio::test]
        async fn an_owned_item_renders() {
            let mut ext_cxn = FakeExternalConnectivity::new();
            let task_service = MockTaskService::new_locked();
            task_service
                .lock()
                .unwrap()
                .item_for_edit_result
                .set_returned_anyhow(Ok(Some(TodoItem {
                    id: 42,
                    content: "Buy milk".to_owned(),
                    due_date: None,
                })));
            let dummy_reader = InMemoryTaskPersistence::new_locked();

            let response = render_edit_form(
                &user(),
                42,
                CookieJar::new(),
                &mut ext_cxn,
                &task_service,
                &dummy_reader,
            )
            .await;

            assert_eq!(StatusCode::OK, response.status());
        }

        #[tokio::test]
        async fn someone_elses_item_flashes_home() {
            let mut ext_cxn = FakeExternalConnectivity::new();
            let task_service = MockTaskService::new_locked();
            task_service
                .lock()
                .unwrap()
                .item_for_edit_result
                .set_returned_anyhow(Ok(None));
            let dummy_reader = InMemoryTaskPersistence::new_locked();

            let response = render_edit_form(
                &user(),
                42,
                CookieJar::new(),
                &mut ext_cxn,
                &task_service,
                &dummy_reader,
            )
            .await;

            assert_eq!(StatusCode::SEE_OTHER, response.status());
            assert_that!(location_of(&response)).is_equal_to("/".to_owned());
            assert_that!(flash_message_of(&response))
                .is_some()
                .is_equal_to("Task not found or not authorized.".to_owned());
        }
    }

    mod update_item {
        use super::*;

        #[tokio::test]
        async fn happy_path_redirects_home() {
            let mut ext_cxn = FakeExternalConnectivity::new();
            let task_service = MockTaskService::new_locked();
            task_service
                .lock()
                .unwrap()
                .update_item_content_result
                .set_returned_result(Ok(()));
            let task_write = InMemoryTaskPersistence::new_locked();

            let response = update_item(
                &user(),
                42,
                CookieJar::new(),
                dto::EditItemForm {
                    content: "Buy oat milk".to_owned(),
                },
                &mut ext_cxn,
                &task_service,
                &task_write,
            )
            .await;

            assert_eq!(StatusCode::SEE_OTHER, response.status());
            assert_that!(location_of(&response)).is_equal_to("/".to_owned());

            let locked_service = task_service.lock().unwrap();
            assert_that!(locked_service.update_item_content_result.calls())
                .is_equal_to(&[(42, 1, "Buy oat milk".to_owned())][..]);
        }

        #[tokio::test]
        async fn a_missing_item_flashes_home() {
            let mut ext_cxn = FakeExternalConnectivity::new();
            let task_service = MockTaskService::new_locked();
            task_service
                .lock()
                .unwrap()
                .update_item_content_result
                .set_returned_result(Err(UpdateItemError::NotFoundOrNotOwned));
            let task_write = InMemoryTaskPersistence::new_locked();

            let response = update_item(
                &user(),
                42,
                CookieJar::new(),
                dto::EditItemForm {
                    content: "Buy oat milk".to_owned(),
                },
                &mut ext_cxn,
                &task_service,
                &task_write,
            )
            .await;

            assert_eq!(StatusCode::SEE_OTHER, response.status());
            assert_that!(flash_message_of(&response))
                .is_some()
                .is_equal_to("Task not found or not authorized.".to_owned());
        }

        #[tokio::test]
        async fn empty_content_flashes_without_touching_the_service() {
            let mut ext_cxn = FakeExternalConnectivity::new();
            let task_service = MockTaskService::new_locked();
            let task_write = InMemoryTaskPersistence::new_locked();

            let response = update_item(
                &user(),
                42,
                CookieJar::new(),
                dto::EditItemForm {
                    content: String::new(),
                },
                &mut ext_cxn,
                &task_service,
                &task_write,
            )
            .await;

            assert_that!(flash_message_of(&response))
                .is_some()
                .is_equal_to("Content is required!".to_owned());

            let locked_service = task_service.lock().unwrap();
            assert!(locked_service.update_item_content_result.calls().is_empty());
        }
    }
}
