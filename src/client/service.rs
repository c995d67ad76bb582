//! Contract-bound clients.
//!
//! Two ways to bind a contract to an [`RpcClient`]:
//! - [`rpc_service!`](crate::rpc_service) generates a typed client struct at
//!   compile time, one method per remote method;
//! - [`ContractClient`] dispatches by name against a runtime contract.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::contract::ServiceContract;
use super::dispatch::RpcClient;
use super::error::CallResult;

/// Call-by-name client checked against a [`ServiceContract`]
#[derive(Clone)]
pub struct ContractClient {
    contract: Arc<ServiceContract>,
    client: RpcClient,
}

impl ContractClient {
    pub fn new(contract: ServiceContract, client: RpcClient) -> Self {
        Self {
            contract: Arc::new(contract),
            client,
        }
    }

    pub fn contract(&self) -> &ServiceContract {
        &self.contract
    }

    /// Call `method` with zero or one untyped argument.
    ///
    /// Unknown methods and wrong argument counts are rejected before
    /// anything is encoded.
    pub fn call(&self, method: &str, args: &[Value]) -> CallResult<Value> {
        self.contract.check_call(method, args.len())?;
        self.client.invoke_value(method, args.first().cloned())
    }

    /// Typed variant of [`call`](Self::call)
    pub fn invoke<P, R>(&self, method: &str, arg: Option<&P>) -> CallResult<R>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        self.contract.check_call(method, usize::from(arg.is_some()))?;
        self.client.invoke(method, arg)
    }
}

/// Declare a typed client for a remote service.
///
/// Each method takes zero or one parameter and may override its wire name
/// with `= "name"`:
///
/// ```
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize)]
/// pub struct Lookup { pub id: u64 }
///
/// #[derive(Deserialize)]
/// pub struct User { pub name: String }
///
/// slug_rpc::rpc_service! {
///     /// User directory
///     pub struct UserService {
///         fn get_user(lookup: Lookup) -> User = "getUser";
///         fn ping() -> ();
///     }
/// }
///
/// let contract = UserService::contract().unwrap();
/// assert_eq!(contract.methods()[0].name, "getUser");
/// assert_eq!(contract.methods()[1].params, 0);
/// ```
#[macro_export]
macro_rules! rpc_service {
    (@wire $method:ident) => {
        stringify!($method)
    };
    (@wire $method:ident $wire:literal) => {
        $wire
    };
    (@param_type) => {
        ::std::option::Option::None
    };
    (@param_type $ty:ty) => {
        ::std::option::Option::Some(stringify!($ty))
    };
    (@arg) => {
        ::std::option::Option::None::<&()>
    };
    (@arg $arg:ident) => {
        ::std::option::Option::Some($arg)
    };
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$method_meta:meta])*
                fn $method:ident ( $($arg:ident : $arg_ty:ty)? ) -> $ret:ty $(= $wire:literal)? ;
            )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone)]
        $vis struct $name {
            client: $crate::RpcClient,
        }

        impl $name {
            pub fn new(client: $crate::RpcClient) -> Self {
                Self { client }
            }

            /// Methods of this service, in declaration order
            pub fn contract() -> ::std::result::Result<$crate::ServiceContract, $crate::ContractError> {
                $crate::ServiceContract::new(::std::vec![
                    $(
                        $crate::MethodDescriptor::new(
                            $crate::rpc_service!(@wire $method $($wire)?),
                            $crate::rpc_service!(@param_type $($arg_ty)?),
                            ::std::any::type_name::<$ret>(),
                        ),
                    )*
                ])
            }

            pub fn client(&self) -> &$crate::RpcClient {
                &self.client
            }

            $(
                $(#[$method_meta])*
                pub fn $method(&self $(, $arg: &$arg_ty)?) -> $crate::CallResult<$ret> {
                    self.client.invoke::<_, $ret>(
                        $crate::rpc_service!(@wire $method $($wire)?),
                        $crate::rpc_service!(@arg $($arg)?),
                    )
                }
            )*
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::contract::ContractError;
    use crate::client::error::CallError;
    use crate::client::id::SequentialIdGenerator;
    use crate::client::transport::MockTransport;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Serialize)]
    pub struct TestInput {
        pub name: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct TestOutput {
        pub tags: Vec<String>,
    }

    crate::rpc_service! {
        struct TestService {
            /// Tags for a name
            fn test(input: TestInput) -> TestOutput;
            fn ping() -> ();
            fn server_time() -> i64 = "serverTime";
        }
    }

    fn client(transport: &Arc<MockTransport>) -> RpcClient {
        RpcClient::with_id_generator(transport.clone(), Arc::new(SequentialIdGenerator::default()))
    }

    #[test]
    fn test_generated_contract() {
        let contract = TestService::contract().unwrap();
        let methods = contract.methods();

        assert_eq!(methods.len(), 3);
        assert_eq!(methods[0].name, "test");
        assert_eq!(methods[0].params, 1);
        assert_eq!(methods[0].param_type.as_deref(), Some("TestInput"));
        assert!(methods[0].returns.ends_with("TestOutput"));
        assert_eq!(methods[1].params, 0);
        assert_eq!(methods[2].name, "serverTime");
    }

    #[test]
    fn test_generated_methods_dispatch() {
        let transport = Arc::new(MockTransport::new());
        transport.push_body(r#"{"result":{"tags":["abc","def"]}}"#);
        transport.push_body("{}");
        transport.push_body(r#"{"result":1700000000}"#);
        let service = TestService::new(client(&transport));

        let output = service
            .test(&TestInput {
                name: "David".to_string(),
            })
            .unwrap();
        assert_eq!(output.tags, vec!["abc", "def"]);

        service.ping().unwrap();
        assert_eq!(service.server_time().unwrap(), 1_700_000_000);

        let sent: Vec<Value> = transport
            .sent()
            .iter()
            .map(|b| serde_json::from_slice(b).unwrap())
            .collect();
        assert_eq!(sent[0]["params"], json!({"name": "David"}));
        assert!(sent[1].get("params").is_none());
        assert_eq!(sent[2]["method"], "serverTime");
    }

    #[test]
    fn test_contract_client_checks_before_sending() {
        let transport = Arc::new(MockTransport::replying(r#"{"result":3}"#));
        let contract = ServiceContract::parse(
            r#"
            [[method]]
            name = "add"
            params = 2

            [[method]]
            name = "double"
            params = 1
            "#,
        )
        .unwrap();
        let client = ContractClient::new(contract, client(&transport));

        let err = client.call("add", &[json!(1), json!(2)]).unwrap_err();
        assert!(matches!(
            err,
            CallError::Contract(ContractError::TooManyParameters { .. })
        ));

        let err = client.call("triple", &[json!(1)]).unwrap_err();
        assert!(matches!(err, CallError::Contract(ContractError::UnknownMethod(_))));

        assert!(transport.sent().is_empty());

        assert_eq!(client.call("double", &[json!(1)]).unwrap(), json!(3));
        assert_eq!(transport.last_request().unwrap()["params"], json!(1));
    }

    #[test]
    fn test_contract_client_typed_invoke() {
        let transport = Arc::new(MockTransport::replying(r#"{"result":"pong"}"#));
        let contract = ServiceContract::new(vec![crate::MethodDescriptor::new("ping", None, "String")]).unwrap();
        let client = ContractClient::new(contract, client(&transport));

        let reply: String = client.invoke("ping", None::<&()>).unwrap();
        assert_eq!(reply, "pong");

        let err = client.invoke::<_, String>("ping", Some(&1)).unwrap_err();
        assert!(matches!(
            err,
            CallError::Contract(ContractError::ArityMismatch { .. })
        ));
    }
}
