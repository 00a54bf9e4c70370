use proptest::prelude::*;
use uuid::Uuid;
use vendor_portal::{
    config::RoutePaths,
    gateway::{CallerContext, RoutingDecision, decide},
    images::{derive_path, normalize, public_url},
    models::{AccountStatus, CallerProfile, Identity, ImageItem, Role},
};

const PUBLIC_ROOT: &str = "https://project.supabase.co/storage/v1/object/public";

// --- Strategies ---

/// One URL-safe path segment, as routes and storage keys are written.
fn arb_segment() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z0-9_-]{1,8}").unwrap()
}

/// A storage key segment including characters that must be escaped in a URL.
fn arb_key_segment() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9 _.~+%?#&é-]{1,8}").unwrap()
}

fn arb_storage_path() -> impl Strategy<Value = String> {
    prop::collection::vec(arb_key_segment(), 1..4).prop_map(|segments| segments.join("/"))
}

/// `prefix` itself or any path nested below it.
fn arb_path_under(prefix: &'static str) -> impl Strategy<Value = String> {
    prop::collection::vec(arb_segment(), 0..4).prop_map(move |segments| {
        if segments.is_empty() {
            prefix.to_string()
        } else {
            format!("{prefix}/{}", segments.join("/"))
        }
    })
}

/// Non-root paths whose first segment is not one of the anonymous carve-outs.
fn arb_path_outside_carve_outs() -> impl Strategy<Value = String> {
    prop::collection::vec(arb_segment(), 1..4)
        .prop_filter("first segment is a carve-out", |segments| {
            segments[0] != "auth" && segments[0] != "api"
        })
        .prop_map(|segments| format!("/{}", segments.join("/")))
}

/// Non-root paths outside the admin section.
fn arb_path_outside_admin() -> impl Strategy<Value = String> {
    prop::collection::vec(arb_segment(), 1..4)
        .prop_filter("first segment is the admin section", |segments| {
            segments[0] != "admin"
        })
        .prop_map(|segments| format!("/{}", segments.join("/")))
}

fn arb_public_url() -> impl Strategy<Value = String> {
    prop_oneof![
        arb_storage_path().prop_map(|path| public_url(PUBLIC_ROOT, &path)),
        arb_segment().prop_map(|name| format!("https://cdn.example.com/{name}.png")),
        Just(format!("{PUBLIC_ROOT}/?v=1")),
        Just(format!("{PUBLIC_ROOT}/products/a%FF.png")),
    ]
}

fn arb_image_item() -> impl Strategy<Value = ImageItem> {
    let optional = |s: BoxedStrategy<String>| prop::option::of(prop_oneof![Just(String::new()), s]);
    prop_oneof![
        arb_public_url().prop_map(ImageItem::Url),
        (
            optional(arb_public_url().boxed()),
            optional(arb_storage_path().boxed())
        )
            .prop_map(|(url, path)| ImageItem::Object { url, path }),
    ]
}

/// Any role string other than `admin`, including the vendor role.
fn arb_non_admin_role() -> impl Strategy<Value = Role> {
    prop::string::string_regex("[a-z]{1,10}")
        .unwrap()
        .prop_map(Role::from)
        .prop_filter("admin role", |role| !role.is_admin())
}

fn identified(role: Role) -> CallerContext {
    CallerContext::Identified(CallerProfile {
        id: Uuid::new_v4(),
        role,
        status: AccountStatus::Active,
    })
}

fn no_profile() -> CallerContext {
    CallerContext::IdentifiedNoProfile(Identity {
        id: Uuid::new_v4(),
        email: None,
    })
}

fn redirect(target: &str) -> RoutingDecision {
    RoutingDecision::RedirectTo(target.to_string())
}

// --- Image normalization ---

proptest! {
    /// Normalizing an already normalized list changes nothing.
    #[test]
    fn proptest_normalize_is_idempotent(items in prop::collection::vec(arb_image_item(), 0..6)) {
        let once = normalize(&items);
        let again = normalize(&once.iter().cloned().map(ImageItem::from).collect::<Vec<_>>());
        prop_assert_eq!(again, once);
    }

    /// Order and length are preserved, and bare URLs keep their URL.
    #[test]
    fn proptest_normalize_preserves_entries(items in prop::collection::vec(arb_image_item(), 0..6)) {
        let normalized = normalize(&items);
        prop_assert_eq!(normalized.len(), items.len());
        for (item, image) in items.iter().zip(&normalized) {
            if let ImageItem::Url(url) = item {
                prop_assert_eq!(&image.url, url);
                prop_assert!(!image.path.is_empty());
            }
        }
    }

    /// A path addressed under the public root is recovered exactly.
    #[test]
    fn proptest_public_url_round_trips(path in arb_storage_path()) {
        prop_assert_eq!(derive_path(&public_url(PUBLIC_ROOT, &path)), path);
    }

    /// A derived path is never empty and never carries a replacement character.
    #[test]
    fn proptest_derive_path_is_never_lossy(url in arb_public_url()) {
        let path = derive_path(&url);
        prop_assert!(!path.is_empty());
        prop_assert!(!path.contains('\u{FFFD}'), "derived path contains U+FFFD: {:?}", path);
    }
}

// --- Routing policy ---

proptest! {
    #[test]
    fn proptest_anonymous_outside_carve_outs_goes_to_login(path in arb_path_outside_carve_outs()) {
        prop_assert_eq!(
            decide(&CallerContext::Anonymous, &path, &RoutePaths::default()),
            redirect("/auth/login")
        );
    }

    #[test]
    fn proptest_anonymous_carve_outs_are_allowed(
        path in prop_oneof![arb_path_under("/auth"), arb_path_under("/api")]
    ) {
        prop_assert_eq!(
            decide(&CallerContext::Anonymous, &path, &RoutePaths::default()),
            RoutingDecision::Allow
        );
    }

    /// Vendors, callers without a profile and unknown roles never reach the admin section.
    #[test]
    fn proptest_non_admins_are_sent_back_from_admin(
        path in arb_path_under("/admin"),
        role in arb_non_admin_role(),
    ) {
        let routes = RoutePaths::default();
        prop_assert_eq!(decide(&identified(role), &path, &routes), redirect("/vendor"));
        prop_assert_eq!(decide(&no_profile(), &path, &routes), redirect("/vendor"));
    }

    #[test]
    fn proptest_admin_reaches_admin_section(path in arb_path_under("/admin")) {
        prop_assert_eq!(
            decide(&identified(Role::Admin), &path, &RoutePaths::default()),
            RoutingDecision::Allow
        );
    }

    /// Outside the root and the admin section every signed-in caller passes,
    /// including on paths that merely start with the admin prefix text.
    #[test]
    fn proptest_signed_in_callers_pass_elsewhere(
        path in prop_oneof![
            arb_path_outside_admin(),
            arb_segment().prop_map(|tail| format!("/admin{tail}")),
        ],
        role in prop_oneof![Just(Role::Admin), arb_non_admin_role()],
    ) {
        let routes = RoutePaths::default();
        prop_assert_eq!(decide(&identified(role), &path, &routes), RoutingDecision::Allow);
        prop_assert_eq!(decide(&no_profile(), &path, &routes), RoutingDecision::Allow);
    }

    /// Every path gets exactly one decision, and a redirect never points back at
    /// the path that produced it.
    #[test]
    fn proptest_redirects_never_loop(
        path in prop_oneof![
            Just("/".to_string()),
            arb_path_outside_carve_outs(),
            arb_path_under("/auth"),
            arb_path_under("/admin"),
        ],
        role in prop::option::of(prop_oneof![Just(Role::Admin), arb_non_admin_role()]),
    ) {
        let routes = RoutePaths::default();
        let context = match role {
            Some(role) => identified(role),
            None => CallerContext::Anonymous,
        };
        if let RoutingDecision::RedirectTo(target) = decide(&context, &path, &routes) {
            prop_assert_ne!(&target, &path);
            prop_assert_eq!(decide(&context, &target, &routes), RoutingDecision::Allow);
        }
    }
}
