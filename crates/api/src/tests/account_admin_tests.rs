// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{
    NOW, book_regular, create_test_admin, create_test_customer, create_test_event,
    create_test_persistence,
};
use crate::{
    ChangeRoleRequest, DASHBOARD_RECENT_BOOKINGS, ListAccountsQuery, Role, account_dashboard,
    account_stats, cancel_booking, change_account_role, delete_account, get_account, list_accounts,
};
use time::Duration;

fn role_request(role: &str) -> ChangeRoleRequest {
    ChangeRoleRequest {
        role: role.to_string(),
    }
}

#[test]
fn test_dashboard_counts_own_bookings() {
    let mut persistence = create_test_persistence();
    let admin = create_test_admin(&mut persistence);
    let ada = create_test_customer(&mut persistence, "ada@example.com");
    let bob = create_test_customer(&mut persistence, "bob@example.com");
    let event = create_test_event(&mut persistence, &admin, 20);

    let kept = book_regular(&mut persistence, event.event_id, &ada, 2);
    let dropped = book_regular(&mut persistence, event.event_id, &ada, 1);
    book_regular(&mut persistence, event.event_id, &bob, 3);
    cancel_booking(&mut persistence, &dropped.booking_id, &ada, NOW).unwrap();

    let dashboard = account_dashboard(&mut persistence, &ada, NOW).unwrap();

    assert_eq!(dashboard.stats.total_bookings, 2);
    assert_eq!(dashboard.stats.confirmed_bookings, 1);
    assert_eq!(dashboard.stats.upcoming_events, 1);
    assert_eq!(dashboard.recent_bookings.len(), 2);
    assert!(
        dashboard
            .recent_bookings
            .iter()
            .any(|booking| booking.booking_id == kept.booking_id)
    );
    assert!(
        dashboard
            .recent_bookings
            .iter()
            .all(|booking| booking.account_id == ada.account_id)
    );
}

#[test]
fn test_dashboard_ignores_past_events_and_caps_recent_list() {
    let mut persistence = create_test_persistence();
    let admin = create_test_admin(&mut persistence);
    let ada = create_test_customer(&mut persistence, "ada@example.com");
    let event = create_test_event(&mut persistence, &admin, 50);

    for _ in 0..=DASHBOARD_RECENT_BOOKINGS {
        book_regular(&mut persistence, event.event_id, &ada, 1);
    }

    let after_show = NOW + Duration::days(365);
    let dashboard = account_dashboard(&mut persistence, &ada, after_show).unwrap();

    assert_eq!(
        dashboard.stats.total_bookings,
        DASHBOARD_RECENT_BOOKINGS + 1
    );
    assert_eq!(
        dashboard.stats.confirmed_bookings,
        DASHBOARD_RECENT_BOOKINGS + 1
    );
    assert_eq!(dashboard.stats.upcoming_events, 0);
    assert_eq!(dashboard.recent_bookings.len(), DASHBOARD_RECENT_BOOKINGS);
}

#[test]
fn test_dashboard_for_new_customer_is_empty() {
    let mut persistence = create_test_persistence();
    let ada = create_test_customer(&mut persistence, "ada@example.com");

    let dashboard = account_dashboard(&mut persistence, &ada, NOW).unwrap();

    assert_eq!(dashboard.stats.total_bookings, 0);
    assert_eq!(dashboard.stats.upcoming_events, 0);
    assert!(dashboard.recent_bookings.is_empty());
}

#[test]
fn test_list_accounts_filters_and_pages() {
    let mut persistence = create_test_persistence();
    let admin = create_test_admin(&mut persistence);
    create_test_customer(&mut persistence, "ada@example.com");
    create_test_customer(&mut persistence, "bob@example.com");
    create_test_customer(&mut persistence, "carol@example.com");

    let everyone = list_accounts(&mut persistence, &ListAccountsQuery::default(), &admin).unwrap();
    assert_eq!(everyone.total, 4);
    assert_eq!(everyone.accounts.len(), 4);
    assert_eq!(everyone.current_page, 1);

    let customers = ListAccountsQuery {
        role: Some(String::from("Customer")),
        limit: Some(2),
        ..ListAccountsQuery::default()
    };
    let first = list_accounts(&mut persistence, &customers, &admin).unwrap();
    assert_eq!(first.total, 3);
    assert_eq!(first.total_pages, 2);
    assert_eq!(first.accounts.len(), 2);
    assert!(first.accounts.iter().all(|account| account.role == "Customer"));

    let second = ListAccountsQuery {
        page: Some(2),
        ..customers
    };
    let second = list_accounts(&mut persistence, &second, &admin).unwrap();
    assert_eq!(second.accounts.len(), 1);
    assert_eq!(second.current_page, 2);

    let search = ListAccountsQuery {
        search: Some(String::from("  bob  ")),
        ..ListAccountsQuery::default()
    };
    let found = list_accounts(&mut persistence, &search, &admin).unwrap();
    assert_eq!(found.total, 1);
    assert_eq!(found.accounts[0].login_name, "bob@example.com");
}

#[test]
fn test_list_accounts_search_treats_wildcards_literally() {
    let mut persistence = create_test_persistence();
    let admin = create_test_admin(&mut persistence);
    create_test_customer(&mut persistence, "ada@example.com");

    let query = ListAccountsQuery {
        search: Some(String::from("%")),
        ..ListAccountsQuery::default()
    };
    let found = list_accounts(&mut persistence, &query, &admin).unwrap();

    assert_eq!(found.total, 0);
    assert!(found.accounts.is_empty());
}

#[test]
fn test_list_accounts_rejects_unknown_role_and_customers() {
    let mut persistence = create_test_persistence();
    let admin = create_test_admin(&mut persistence);
    let ada = create_test_customer(&mut persistence, "ada@example.com");

    let query = ListAccountsQuery {
        role: Some(String::from("Superuser")),
        ..ListAccountsQuery::default()
    };
    let err = list_accounts(&mut persistence, &query, &admin).unwrap_err();
    assert_eq!(err.kind(), "invalid_input");

    let err = list_accounts(&mut persistence, &ListAccountsQuery::default(), &ada).unwrap_err();
    assert_eq!(err.kind(), "access_denied");
}

#[test]
fn test_get_account_includes_bookings() {
    let mut persistence = create_test_persistence();
    let admin = create_test_admin(&mut persistence);
    let ada = create_test_customer(&mut persistence, "ada@example.com");
    let event = create_test_event(&mut persistence, &admin, 10);
    let booking = book_regular(&mut persistence, event.event_id, &ada, 2);

    let details = get_account(&mut persistence, ada.account_id, &admin, NOW).unwrap();

    assert_eq!(details.account.login_name, "ada@example.com");
    assert_eq!(details.account.role, "Customer");
    assert_eq!(details.bookings.len(), 1);
    assert_eq!(details.bookings[0].booking_id, booking.booking_id);

    let missing = get_account(&mut persistence, 9_999, &admin, NOW).unwrap_err();
    assert_eq!(missing.kind(), "not_found");
}

#[test]
fn test_change_role_promotes_customer() {
    let mut persistence = create_test_persistence();
    let admin = create_test_admin(&mut persistence);
    let ada = create_test_customer(&mut persistence, "ada@example.com");

    let promoted = change_account_role(
        &mut persistence,
        ada.account_id,
        &role_request("Admin"),
        &admin,
    )
    .unwrap();
    assert_eq!(promoted.role, "Admin");

    let stored = persistence
        .get_account_by_id(ada.account_id)
        .unwrap()
        .unwrap();
    assert_eq!(stored.role, Role::Admin.as_str());

    let unchanged = change_account_role(
        &mut persistence,
        ada.account_id,
        &role_request("Admin"),
        &admin,
    )
    .unwrap();
    assert_eq!(unchanged.role, "Admin");
}

#[test]
fn test_change_role_refuses_own_account_and_unknown_roles() {
    let mut persistence = create_test_persistence();
    let admin = create_test_admin(&mut persistence);
    let ada = create_test_customer(&mut persistence, "ada@example.com");

    let own = change_account_role(
        &mut persistence,
        admin.account_id,
        &role_request("Customer"),
        &admin,
    )
    .unwrap_err();
    assert_eq!(own.kind(), "invalid_transition");

    let unknown = change_account_role(
        &mut persistence,
        ada.account_id,
        &role_request("Owner"),
        &admin,
    )
    .unwrap_err();
    assert_eq!(unknown.kind(), "invalid_input");

    let missing = change_account_role(&mut persistence, 9_999, &role_request("Admin"), &admin)
        .unwrap_err();
    assert_eq!(missing.kind(), "not_found");

    let by_customer = change_account_role(
        &mut persistence,
        ada.account_id,
        &role_request("Admin"),
        &ada,
    )
    .unwrap_err();
    assert_eq!(by_customer.kind(), "access_denied");
}

#[test]
fn test_delete_account_without_bookings() {
    let mut persistence = create_test_persistence();
    let admin = create_test_admin(&mut persistence);
    let ada = create_test_customer(&mut persistence, "ada@example.com");
    persistence
        .create_session("ada-token", ada.account_id, NOW, NOW + Duration::hours(1))
        .unwrap();

    let response = delete_account(&mut persistence, ada.account_id, &admin).unwrap();

    assert!(response.deleted);
    assert_eq!(response.account_id, ada.account_id);
    assert!(persistence.get_account_by_id(ada.account_id).unwrap().is_none());
    assert!(persistence.get_session_by_token("ada-token").unwrap().is_none());

    let again = delete_account(&mut persistence, ada.account_id, &admin).unwrap_err();
    assert_eq!(again.kind(), "not_found");
}

#[test]
fn test_delete_account_keeps_accounts_with_bookings() {
    let mut persistence = create_test_persistence();
    let admin = create_test_admin(&mut persistence);
    let ada = create_test_customer(&mut persistence, "ada@example.com");
    let event = create_test_event(&mut persistence, &admin, 10);
    let booking = book_regular(&mut persistence, event.event_id, &ada, 1);
    cancel_booking(&mut persistence, &booking.booking_id, &ada, NOW).unwrap();

    let err = delete_account(&mut persistence, ada.account_id, &admin).unwrap_err();
    assert_eq!(err.kind(), "invalid_transition");
    assert!(persistence.get_account_by_id(ada.account_id).unwrap().is_some());

    let own = delete_account(&mut persistence, admin.account_id, &admin).unwrap_err();
    assert_eq!(own.kind(), "invalid_transition");

    let by_customer = delete_account(&mut persistence, admin.account_id, &ada).unwrap_err();
    assert_eq!(by_customer.kind(), "access_denied");
}

#[test]
fn test_account_stats_counts_roles_and_new_accounts() {
    let mut persistence = create_test_persistence();
    let admin = create_test_admin(&mut persistence);
    let ada = create_test_customer(&mut persistence, "ada@example.com");
    create_test_customer(&mut persistence, "bob@example.com");

    let stats = account_stats(&mut persistence, &admin, NOW).unwrap();
    assert_eq!(stats.total_accounts, 3);
    assert_eq!(stats.admin_accounts, 1);
    assert_eq!(stats.customer_accounts, 2);
    assert_eq!(stats.new_accounts, 3);

    let later = account_stats(&mut persistence, &admin, NOW + Duration::days(31)).unwrap();
    assert_eq!(later.total_accounts, 3);
    assert_eq!(later.new_accounts, 0);

    let err = account_stats(&mut persistence, &ada, NOW).unwrap_err();
    assert_eq!(err.kind(), "access_denied");
}
