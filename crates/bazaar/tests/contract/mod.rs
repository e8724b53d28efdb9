//! Behavioral contract shared by every `MarketStore` implementation.
//!
//! Each case is an async fn generic over the store. `contract_suite!`
//! instantiates all of them as `#[tokio::test]`s for one [`Harness`].

#![allow(dead_code)]

use bazaar::{
    Institution, Listing, ListingFilter, ListingId, ListingPatch, MarketStore, NewListing,
    SortOrder, StoreError, StoreResult, User, UserPatch,
};

/// Provides a fresh, empty store per test case.
#[allow(async_fn_in_trait)]
pub trait Harness: Sized {
    type Store: MarketStore;

    /// `None` means the backend is not reachable here and the case is skipped.
    async fn setup(case: &str) -> Option<Self>;

    fn store(&self) -> &Self::Store;

    async fn teardown(self) {}
}

macro_rules! contract_suite {
    ($harness:ty) => {
        contract_suite!(@cases $harness;
            unfiltered_read_returns_exactly_available,
            title_filter_is_case_insensitive_and_complete,
            title_filter_matches_metacharacters_literally,
            price_range_is_inclusive,
            inverted_price_range_matches_nothing,
            nan_price_bound_is_ignored,
            title_filter_folds_ascii_only,
            tag_filter_matches_any_intersection,
            sorted_reads_are_monotonic,
            bike_and_helmet_sorted_by_price,
            create_then_read_round_trip,
            create_rejects_negative_price,
            update_changes_only_present_fields,
            update_is_idempotent,
            update_replaces_tags,
            empty_update_is_no_op,
            update_missing_listing_returns_false,
            update_rejects_negative_price,
            legacy_patch_writes_availability,
            delete_reports_removal,
            identities_are_unique_and_not_reused,
            owner_view_includes_unavailable,
            strict_read_reports_not_found,
            duplicate_user_is_rejected,
            user_round_trip_and_update,
        );
    };
    (@cases $harness:ty; $($case:ident),* $(,)?) => {
        $(
            #[tokio::test]
            async fn $case() -> bazaar::StoreResult<()> {
                let Some(harness) =
                    <$harness as crate::contract::Harness>::setup(stringify!($case)).await
                else {
                    return Ok(());
                };
                let result = crate::contract::$case(
                    crate::contract::Harness::store(&harness),
                )
                .await;
                crate::contract::Harness::teardown(harness).await;
                result
            }
        )*
    };
}

fn item(title: &str, price: f64) -> NewListing {
    NewListing {
        seller_id: "seller-1".into(),
        title: title.into(),
        description: format!("{title} in good shape"),
        price,
        category: "Other".into(),
        condition: "Used".into(),
        image_url: format!("https://img.example/{}.png", title.to_lowercase()),
        tags: Vec::new(),
        available: true,
    }
}

fn user(external_id: &str) -> User {
    User {
        external_id: external_id.into(),
        email: format!("{external_id}@brown.edu"),
        display_name: "Josiah".into(),
        phone_number: "401-555-0100".into(),
        institution: Institution::Brown,
    }
}

fn ids(listings: &[Listing]) -> Vec<ListingId> {
    listings.iter().map(|l| l.id).collect()
}

fn sorted_ids(listings: &[Listing]) -> Vec<ListingId> {
    let mut ids = ids(listings);
    ids.sort_unstable();
    ids
}

fn titles(listings: &[Listing]) -> Vec<&str> {
    listings.iter().map(|l| l.title.as_str()).collect()
}

pub async fn unfiltered_read_returns_exactly_available<S: MarketStore>(
    store: &S,
) -> StoreResult<()> {
    let a = store.create_listing(item("Bike", 100.0)).await?;
    let b = store.create_listing(item("Helmet", 50.0)).await?;
    store
        .create_listing(NewListing {
            available: false,
            ..item("Sold Lamp", 10.0)
        })
        .await?;

    let listings = store.read_listings(&ListingFilter::new()).await?;
    let mut expected = vec![a, b];
    expected.sort_unstable();
    assert_eq!(sorted_ids(&listings), expected);
    Ok(())
}

pub async fn title_filter_is_case_insensitive_and_complete<S: MarketStore>(
    store: &S,
) -> StoreResult<()> {
    let road = store.create_listing(item("Road BIKE", 120.0)).await?;
    let kids = store.create_listing(item("kids bike", 40.0)).await?;
    store.create_listing(item("Helmet", 50.0)).await?;
    store
        .create_listing(NewListing {
            available: false,
            ..item("Old Bike", 5.0)
        })
        .await?;

    let listings = store
        .read_listings(&ListingFilter::new().title("  bIkE "))
        .await?;
    let mut expected = vec![road, kids];
    expected.sort_unstable();
    assert_eq!(sorted_ids(&listings), expected);
    assert!(
        listings
            .iter()
            .all(|l| l.title.to_lowercase().contains("bike"))
    );
    Ok(())
}

pub async fn title_filter_matches_metacharacters_literally<S: MarketStore>(
    store: &S,
) -> StoreResult<()> {
    let sale = store.create_listing(item("Lamp 50% off", 20.0)).await?;
    store.create_listing(item("Lamp 500 watts", 20.0)).await?;
    store.create_listing(item("desk_lamp", 20.0)).await?;

    let percent = store.read_listings(&ListingFilter::new().title("50%")).await?;
    assert_eq!(ids(&percent), vec![sale]);

    let underscore = store.read_listings(&ListingFilter::new().title("k_l")).await?;
    assert_eq!(titles(&underscore), vec!["desk_lamp"]);

    let none = store.read_listings(&ListingFilter::new().title("p 5_")).await?;
    assert!(none.is_empty());
    Ok(())
}

pub async fn price_range_is_inclusive<S: MarketStore>(store: &S) -> StoreResult<()> {
    store.create_listing(item("Cheap", 9.99)).await?;
    let low = store.create_listing(item("Low", 10.0)).await?;
    let mid = store.create_listing(item("Mid", 15.5)).await?;
    let high = store.create_listing(item("High", 20.0)).await?;
    store.create_listing(item("Pricey", 20.01)).await?;

    let listings = store
        .read_listings(
            &ListingFilter::new()
                .min_price(10.0)
                .max_price(20.0)
                .sort(SortOrder::PriceAsc),
        )
        .await?;
    assert_eq!(ids(&listings), vec![low, mid, high]);
    assert!(listings.iter().all(|l| (10.0..=20.0).contains(&l.price)));
    Ok(())
}

pub async fn inverted_price_range_matches_nothing<S: MarketStore>(
    store: &S,
) -> StoreResult<()> {
    store.create_listing(item("Bike", 30.0)).await?;
    let listings = store
        .read_listings(&ListingFilter::new().min_price(50.0).max_price(10.0))
        .await?;
    assert!(listings.is_empty());
    Ok(())
}

pub async fn nan_price_bound_is_ignored<S: MarketStore>(store: &S) -> StoreResult<()> {
    let cheap = store.create_listing(item("Bike", 30.0)).await?;
    let dear = store.create_listing(item("Canoe", 900.0)).await?;
    let mut expected = vec![cheap, dear];
    expected.sort_unstable();

    let listings = store
        .read_listings(&ListingFilter::new().min_price(f64::NAN).max_price(f64::NAN))
        .await?;
    assert_eq!(sorted_ids(&listings), expected);

    let listings = store
        .read_listings(&ListingFilter::new().min_price(f64::NAN).max_price(100.0))
        .await?;
    assert_eq!(ids(&listings), vec![cheap]);
    Ok(())
}

pub async fn title_filter_folds_ascii_only<S: MarketStore>(store: &S) -> StoreResult<()> {
    let cafe = store.create_listing(item("CAFÉ Table", 80.0)).await?;

    let listings = store
        .read_listings(&ListingFilter::new().title("café table"))
        .await?;
    assert!(listings.is_empty());

    let listings = store.read_listings(&ListingFilter::new().title("CAFÉ table")).await?;
    assert_eq!(ids(&listings), vec![cafe]);

    let listings = store.read_listings(&ListingFilter::new().title("caf")).await?;
    assert_eq!(ids(&listings), vec![cafe]);
    Ok(())
}

pub async fn tag_filter_matches_any_intersection<S: MarketStore>(
    store: &S,
) -> StoreResult<()> {
    let desk = store
        .create_listing(NewListing {
            tags: vec!["furniture".into(), "desk".into()],
            ..item("Desk", 60.0)
        })
        .await?;
    let lamp = store
        .create_listing(NewListing {
            tags: vec!["lighting".into()],
            ..item("Lamp", 15.0)
        })
        .await?;
    store
        .create_listing(NewListing {
            tags: vec!["outdoor".into()],
            ..item("Tent", 80.0)
        })
        .await?;
    store.create_listing(item("Untagged", 5.0)).await?;

    let listings = store
        .read_listings(&ListingFilter::new().tags(["desk", "lighting", "nothing"]))
        .await?;
    let mut expected = vec![desk, lamp];
    expected.sort_unstable();
    assert_eq!(sorted_ids(&listings), expected);

    // Tag matching is exact, not substring or case-insensitive.
    let listings = store
        .read_listings(&ListingFilter::new().tags(["Desk", "light"]))
        .await?;
    assert!(listings.is_empty());
    Ok(())
}

pub async fn sorted_reads_are_monotonic<S: MarketStore>(store: &S) -> StoreResult<()> {
    for (title, price) in [("A", 30.0), ("B", 5.0), ("C", 30.0), ("D", 12.0), ("E", 0.0)] {
        store.create_listing(item(title, price)).await?;
    }

    let asc = store
        .read_listings(&ListingFilter::new().sort(SortOrder::PriceAsc))
        .await?;
    assert_eq!(asc.len(), 5);
    assert!(asc.windows(2).all(|w| w[0].price <= w[1].price));

    let desc = store
        .read_listings(&ListingFilter::new().sort_token(Some("PRICE_DESC"))?)
        .await?;
    assert_eq!(desc.len(), 5);
    assert!(desc.windows(2).all(|w| w[0].price >= w[1].price));

    // Equal prices fall back to ascending identity in both directions.
    let tied: Vec<_> = desc.iter().filter(|l| l.price == 30.0).map(|l| l.id).collect();
    assert!(tied.windows(2).all(|w| w[0] < w[1]));

    let err = ListingFilter::new().sort_token(Some("NEWEST")).unwrap_err();
    assert!(matches!(err, StoreError::InvalidSort { .. }));
    Ok(())
}

pub async fn bike_and_helmet_sorted_by_price<S: MarketStore>(store: &S) -> StoreResult<()> {
    store.create_listing(item("Bike", 100.0)).await?;
    store.create_listing(item("Helmet", 50.0)).await?;

    let listings = store
        .read_listings(
            &ListingFilter::new()
                .category("Other")
                .sort(SortOrder::PriceAsc),
        )
        .await?;
    assert_eq!(titles(&listings), vec!["Helmet", "Bike"]);
    Ok(())
}

pub async fn create_then_read_round_trip<S: MarketStore>(store: &S) -> StoreResult<()> {
    let fields = NewListing {
        tags: vec!["road".into(), "blue".into(), "road".into()],
        ..item("Bike", 100.0)
    };
    let id = store.create_listing(fields.clone()).await?;

    let stored = store.read_listing_by_id(id).await?;
    assert_eq!(stored, Some(fields.into_listing(id)));

    assert_eq!(store.read_listing_by_id(id + 1_000).await?, None);
    Ok(())
}

pub async fn create_rejects_negative_price<S: MarketStore>(store: &S) -> StoreResult<()> {
    let err = store
        .create_listing(item("Refund", -1.0))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidValue { ref field, .. } if field == "price"));
    assert!(store.read_listings(&ListingFilter::new()).await?.is_empty());
    Ok(())
}

pub async fn update_changes_only_present_fields<S: MarketStore>(
    store: &S,
) -> StoreResult<()> {
    let id = store
        .create_listing(NewListing {
            tags: vec!["outdoor".into()],
            ..item("Bike", 100.0)
        })
        .await?;
    let before = store.listing(id).await?;

    let applied = store
        .update_listing(id, &ListingPatch::new().title("Mountain Bike"))
        .await?;
    assert!(applied);

    let after = store.listing(id).await?;
    assert_eq!(after.title, "Mountain Bike");
    assert_eq!(after.price, 100.0);
    assert_eq!(
        Listing {
            title: before.title.clone(),
            ..after
        },
        before
    );
    Ok(())
}

pub async fn update_is_idempotent<S: MarketStore>(store: &S) -> StoreResult<()> {
    let id = store.create_listing(item("Bike", 100.0)).await?;
    let patch = ListingPatch::new()
        .price(85.0)
        .condition("Like New")
        .available(false);

    assert!(store.update_listing(id, &patch).await?);
    let once = store.listing(id).await?;
    assert!(store.update_listing(id, &patch).await?);
    let twice = store.listing(id).await?;
    assert_eq!(once, twice);
    assert_eq!(twice.price, 85.0);
    assert!(!twice.available);
    Ok(())
}

pub async fn update_replaces_tags<S: MarketStore>(store: &S) -> StoreResult<()> {
    let id = store
        .create_listing(NewListing {
            tags: vec!["a".into(), "b".into()],
            ..item("Bike", 100.0)
        })
        .await?;

    store
        .update_listing(id, &ListingPatch::new().tags(["c"]))
        .await?;
    assert_eq!(store.listing(id).await?.tags, vec!["c".to_string()]);

    store
        .update_listing(id, &ListingPatch::new().tags(Vec::<String>::new()))
        .await?;
    assert!(store.listing(id).await?.tags.is_empty());
    Ok(())
}

pub async fn empty_update_is_no_op<S: MarketStore>(store: &S) -> StoreResult<()> {
    let id = store.create_listing(item("Bike", 100.0)).await?;
    let before = store.listing(id).await?;

    let err = store
        .update_listing(id, &ListingPatch::new())
        .await
        .unwrap_err();
    assert!(err.is_no_op());
    assert!(!err.is_not_found());

    let err = store
        .update_user("nobody", &UserPatch::new())
        .await
        .unwrap_err();
    assert!(err.is_no_op());

    assert_eq!(store.listing(id).await?, before);
    Ok(())
}

pub async fn update_missing_listing_returns_false<S: MarketStore>(
    store: &S,
) -> StoreResult<()> {
    let id = store.create_listing(item("Bike", 100.0)).await?;
    store.delete_listing(id).await?;

    let applied = store
        .update_listing(id, &ListingPatch::new().title("Ghost"))
        .await?;
    assert!(!applied);
    assert_eq!(store.read_listing_by_id(id).await?, None);
    Ok(())
}

pub async fn update_rejects_negative_price<S: MarketStore>(store: &S) -> StoreResult<()> {
    let id = store.create_listing(item("Bike", 100.0)).await?;

    let err = store
        .update_listing(id, &ListingPatch::new().title("Free Bike").price(-1.0))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidValue { ref field, .. } if field == "price"));

    let stored = store.listing(id).await?;
    assert_eq!(stored.title, "Bike");
    assert_eq!(stored.price, 100.0);
    Ok(())
}

pub async fn legacy_patch_writes_availability<S: MarketStore>(store: &S) -> StoreResult<()> {
    let id = store.create_listing(item("Bike", 100.0)).await?;

    let mut patch = ListingPatch::legacy(false);
    patch.title = Some("Bike (sold)".into());
    assert!(store.update_listing(id, &patch).await?);

    let stored = store.listing(id).await?;
    assert!(!stored.available);
    assert!(store.read_listings(&ListingFilter::new()).await?.is_empty());
    Ok(())
}

pub async fn delete_reports_removal<S: MarketStore>(store: &S) -> StoreResult<()> {
    let keep = store.create_listing(item("Keep", 1.0)).await?;
    let gone = store.create_listing(item("Gone", 2.0)).await?;

    assert!(store.delete_listing(gone).await?);
    assert_eq!(store.read_listing_by_id(gone).await?, None);

    assert!(!store.delete_listing(gone).await?);
    assert!(!store.delete_listing(gone + 1_000).await?);
    assert!(store.read_listing_by_id(keep).await?.is_some());
    Ok(())
}

pub async fn identities_are_unique_and_not_reused<S: MarketStore>(
    store: &S,
) -> StoreResult<()> {
    let mut seen = Vec::new();
    for n in 0..5 {
        seen.push(store.create_listing(item(&format!("Item {n}"), 1.0)).await?);
    }
    let last = seen[seen.len() - 1];
    store.delete_listing(last).await?;
    seen.push(store.create_listing(item("After delete", 1.0)).await?);

    let mut unique = seen.clone();
    unique.sort_unstable();
    unique.dedup();
    assert_eq!(unique.len(), seen.len());
    Ok(())
}

pub async fn owner_view_includes_unavailable<S: MarketStore>(store: &S) -> StoreResult<()> {
    let sold = store
        .create_listing(NewListing {
            available: false,
            ..item("Sold", 10.0)
        })
        .await?;
    let open = store.create_listing(item("Open", 20.0)).await?;
    store
        .create_listing(NewListing {
            seller_id: "seller-2".into(),
            ..item("Theirs", 30.0)
        })
        .await?;

    let mine = store.read_listings_by_owner("seller-1").await?;
    assert_eq!(ids(&mine), vec![sold, open]);

    assert!(store.read_listings_by_owner("seller-3").await?.is_empty());
    Ok(())
}

pub async fn strict_read_reports_not_found<S: MarketStore>(store: &S) -> StoreResult<()> {
    let id = store.create_listing(item("Bike", 100.0)).await?;
    assert_eq!(store.listing(id).await?.title, "Bike");

    let err = store.listing(id + 1_000).await.unwrap_err();
    assert!(err.is_not_found());
    Ok(())
}

pub async fn duplicate_user_is_rejected<S: MarketStore>(store: &S) -> StoreResult<()> {
    assert_eq!(store.create_user(user("u-1")).await?, "u-1");

    let err = store
        .create_user(User {
            display_name: "Someone Else".into(),
            ..user("u-1")
        })
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::DuplicateIdentity(ref msg) if msg.contains("u-1")));

    let stored = store.read_user("u-1").await?;
    assert_eq!(stored.map(|u| u.display_name), Some("Josiah".to_string()));
    Ok(())
}

pub async fn user_round_trip_and_update<S: MarketStore>(store: &S) -> StoreResult<()> {
    assert_eq!(store.read_user("u-2").await?, None);

    store.create_user(user("u-2")).await?;
    assert_eq!(store.read_user("u-2").await?, Some(user("u-2")));

    let patch = UserPatch::new()
        .display_name("Jo")
        .institution(Institution::Risd);
    assert!(store.update_user("u-2", &patch).await?);

    let stored = store.read_user("u-2").await?;
    assert_eq!(
        stored,
        Some(User {
            display_name: "Jo".into(),
            institution: Institution::Risd,
            ..user("u-2")
        })
    );

    assert!(!store.update_user("u-missing", &patch).await?);
    Ok(())
}
