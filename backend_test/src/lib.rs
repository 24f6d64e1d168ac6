use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{parse_macro_input, spanned::Spanned, FnArg, Ident, ItemFn, Pat, Signature, Type};

/// Transform an asynchronous test into a synchronous one, inject a local
/// Rocket client backed by a fresh data directory, and ensure that the
/// directory is deleted regardless of how the test terminates.
///
/// The only injectable dependency is [`rocket::local::asynchronous::Client`].
/// `#[backend_test(admin)]` signs the client in as the bootstrap admin and
/// `#[backend_test(user)]` registers and signs in a regular user.
#[proc_macro_attribute]
pub fn backend_test(args: TokenStream, input: TokenStream) -> TokenStream {
    let mut item_fn = parse_macro_input!(input as ItemFn);

    // Reject invalid function signatures.
    let has_client = match check_sig(&item_fn.sig) {
        Ok(has_client) => has_client,
        Err(err) => {
            return err.into_compile_error().into();
        }
    };
    let test_args = has_client.then(|| quote! { rocket_client });

    // Rename the future so the test can have its original name.
    let name = item_fn.sig.ident.clone();
    let new_name = format_ident!("{}_fut", name);
    item_fn.sig.ident = new_name.clone();

    // Sign the client in if needed. Each login sits in its own block so the
    // response is dropped before `setup` hands the client back.
    let maybe_login = match parse_macro_input!(args as Option<Ident>) {
        Some(arg) if arg == "admin" => quote! {{
            let response = rocket_client
                .post(uri!(crate::api::auth::login))
                .header(rocket::http::ContentType::JSON)
                .body(rocket::serde::json::json!(crate::model::user::Credentials::admin_example()).to_string())
                .dispatch()
                .await;
            assert_eq!(rocket::http::Status::Ok, response.status(), "admin login failed");
        }},
        Some(arg) if arg == "user" => quote! {{
            let response = rocket_client
                .post(uri!(crate::api::auth::register))
                .header(rocket::http::ContentType::JSON)
                .body(rocket::serde::json::json!(crate::model::user::Registration::example()).to_string())
                .dispatch()
                .await;
            assert_eq!(rocket::http::Status::Ok, response.status(), "user registration failed");
        }},
        Some(arg) => {
            return syn::Error::new(arg.span(), "Expected `admin` or `user`")
                .into_compile_error()
                .into();
        }
        None => quote! {},
    };

    // Rewrite the test function.
    quote! {
        #[test]
        fn #name() {
            /// Test setup.
            async fn setup(data_dir: &std::path::Path) -> rocket::local::asynchronous::Client {
                log4rs_test_utils::test_logging::init_logging_once_for(
                    ["toalha_backend"],
                    None,
                    None,
                );
                let rocket_client =
                    rocket::local::asynchronous::Client::tracked(crate::rocket_for_data_dir(data_dir))
                        .await
                        .unwrap();

                #maybe_login

                rocket_client
            }

            /// The test itself.
            #item_fn

            /// Test cleanup.
            fn cleanup(data_dir: &std::path::Path) {
                // The directory may never have been created.
                let _ = std::fs::remove_dir_all(data_dir);
            }

            let data_dir = std::env::temp_dir().join(format!(
                "toalha-test-{}-{:016x}",
                stringify!(#name),
                rand::random::<u64>()
            ));

            // Create an async runtime. We need a separate one for inside and
            // outside the `catch_unwind`.
            let outer_runtime = rocket::tokio::runtime::Builder::new_multi_thread()
                .thread_name("test-setup")
                .worker_threads(1)
                .enable_all()
                .build()
                .unwrap();
            let inner_runtime = rocket::tokio::runtime::Builder::new_multi_thread()
                .thread_name("rocket-worker-test-thread")
                .worker_threads(1)
                .enable_all()
                .build()
                .unwrap();

            // Run the setup, cleaning up if it fails.
            let setup_result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                outer_runtime.block_on(setup(&data_dir))
            }));
            let rocket_client = match setup_result {
                Ok(rocket_client) => rocket_client,
                Err(cause) => {
                    cleanup(&data_dir);
                    std::panic::resume_unwind(cause);
                }
            };

            // Run the test, catching any panics.
            // Use mutexes to safely transfer `!UnwindSafe` data.
            let client_mutex = std::sync::Mutex::new(rocket_client);
            let runtime_mutex = std::sync::Mutex::new(inner_runtime);
            let result = std::panic::catch_unwind(|| {
                #[allow(unused_variables)]
                let rocket_client = client_mutex.into_inner().unwrap();
                let runtime = runtime_mutex.into_inner().unwrap();

                runtime.block_on(#new_name(#test_args));
            });

            // Run the cleanup.
            cleanup(&data_dir);

            // If the test panicked, re-raise the panic.
            if let Err(cause) = result {
                std::panic::resume_unwind(cause);
            }
        }
    }
    .into()
}

/// Ensure the wrapped test is async and reject parameters other than a
/// single `Client`. Returns whether the test takes the client.
fn check_sig(sig: &Signature) -> Result<bool, syn::Error> {
    if sig.asyncness.is_none() {
        return Err(syn::Error::new(sig.span(), "Test must be marked `async`"));
    }

    let mut has_client = false;
    for input in &sig.inputs {
        if let FnArg::Typed(pat_type) = input {
            if let (Pat::Ident(_), Type::Path(type_path)) = (&*pat_type.pat, &*pat_type.ty) {
                let is_client = type_path
                    .path
                    .segments
                    .last()
                    .map_or(false, |segment| segment.ident == "Client");
                if is_client {
                    if has_client {
                        return Err(syn::Error::new(
                            input.span(),
                            "Test cannot accept more than one `rocket::local::asynchronous::Client`",
                        ));
                    }
                    has_client = true;
                    continue;
                }
            }
        }

        return Err(syn::Error::new(
            input.span(),
            "Expected `client_ident: Client`",
        ));
    }

    Ok(has_client)
}
