use log::info;
use rocket::{serde::json::Json, Route, State};

use crate::{
    error::Result,
    model::{
        auth::{Admin, AuthToken, Member},
        id::Id,
        shop::{ClaimRequest, NewProduct, Product, Voucher, VoucherRequest},
    },
    store::Store,
};

use super::common::Ack;

pub fn routes() -> Vec<Route> {
    routes![
        products,
        create_product,
        delete_product,
        buy_voucher,
        vouchers,
        claim_voucher,
    ]
}

#[get("/api/products")]
async fn products(store: &State<Store>) -> Json<Vec<Product>> {
    Json(store.registry.read().await.products().to_vec())
}

#[post("/api/products", data = "<new_product>", format = "json")]
async fn create_product(
    _token: AuthToken<Admin>,
    new_product: Json<NewProduct>,
    store: &State<Store>,
) -> Result<Json<Product>> {
    let mut registry = store.registry.write().await;
    let product = registry.add_product(new_product.0)?.clone();
    info!("Added product {} ({})", product.name, product.id);
    Ok(Json(product))
}

/// Vouchers already bought for the product stay claimable.
#[delete("/api/products/<product_id>")]
async fn delete_product(
    _token: AuthToken<Admin>,
    product_id: Id,
    store: &State<Store>,
) -> Result<Json<Ack>> {
    store.registry.write().await.remove_product(&product_id)?;
    Ok(Ack::ok())
}

#[post("/api/vouchers", data = "<request>", format = "json")]
async fn buy_voucher(
    token: AuthToken<Member>,
    request: Json<VoucherRequest>,
    store: &State<Store>,
) -> Result<Json<Voucher>> {
    let mut registry = store.registry.write().await;
    let voucher = registry
        .buy_voucher(&request.product_id, &request.recipient, token.id().clone())?
        .clone();
    info!(
        "User {} bought voucher {} for {}",
        voucher.purchaser_id, voucher.code, voucher.product_name
    );
    Ok(Json(voucher))
}

/// Vouchers bought by the signed-in user.
#[get("/api/vouchers")]
async fn vouchers(token: AuthToken<Member>, store: &State<Store>) -> Json<Vec<Voucher>> {
    Json(store.registry.read().await.vouchers_bought_by(token.id()))
}

#[post("/api/vouchers/<code>/claim", data = "<claim>", format = "json")]
async fn claim_voucher(
    token: AuthToken<Member>,
    code: &str,
    claim: Json<ClaimRequest>,
    store: &State<Store>,
) -> Result<Json<Voucher>> {
    let mut registry = store.registry.write().await;
    let voucher = registry
        .claim_voucher(code, &claim.recipient, token.id().clone())?
        .clone();
    info!("User {} claimed voucher {}", token.id(), voucher.code);
    Ok(Json(voucher))
}
