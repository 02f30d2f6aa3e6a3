// @generated
// Generated from: proto/dex/api.proto
// Manual check-in for offline builds.

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Client {
    #[prost(string, tag = "1")]
    pub id: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub secret: ::prost::alloc::string::String,
    #[prost(string, repeated, tag = "3")]
    pub redirect_uris: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
    #[prost(string, repeated, tag = "4")]
    pub trusted_peers: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
    #[prost(bool, tag = "5")]
    pub public: bool,
    #[prost(string, tag = "6")]
    pub name: ::prost::alloc::string::String,
    #[prost(string, tag = "7")]
    pub logo_url: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ClientInfo {
    #[prost(string, tag = "1")]
    pub id: ::prost::alloc::string::String,
    #[prost(string, repeated, tag = "2")]
    pub redirect_uris: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
    #[prost(string, repeated, tag = "3")]
    pub trusted_peers: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
    #[prost(bool, tag = "4")]
    pub public: bool,
    #[prost(string, tag = "5")]
    pub name: ::prost::alloc::string::String,
    #[prost(string, tag = "6")]
    pub logo_url: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CreateClientReq {
    #[prost(message, optional, tag = "1")]
    pub client: ::core::option::Option<Client>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CreateClientResp {
    #[prost(bool, tag = "1")]
    pub already_exists: bool,
    #[prost(message, optional, tag = "2")]
    pub client: ::core::option::Option<Client>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeleteClientReq {
    #[prost(string, tag = "1")]
    pub id: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeleteClientResp {
    #[prost(bool, tag = "1")]
    pub not_found: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListClientReq {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListClientResp {
    #[prost(message, repeated, tag = "1")]
    pub clients: ::prost::alloc::vec::Vec<ClientInfo>,
}

pub mod dex_client {
    #![allow(clippy::derive_partial_eq_without_eq)]
    use tonic::codegen::*;

    #[derive(Debug, Clone)]
    pub struct DexClient<T> {
        inner: tonic::client::Grpc<T>,
    }

    impl DexClient<tonic::transport::Channel> {
        pub async fn connect<D>(dst: D) -> Result<Self, tonic::transport::Error>
        where
            D: TryInto<tonic::transport::Endpoint>,
            D::Error: Into<StdError>,
        {
            let conn = tonic::transport::Endpoint::new(dst)?.connect().await?;
            Ok(Self::new(conn))
        }
    }

    impl<T> DexClient<T>
    where
        T: tonic::client::GrpcService<tonic::body::BoxBody>,
        T::ResponseBody: Body + Send + 'static,
        T::Error: Into<StdError>,
        <T::ResponseBody as Body>::Error: Into<StdError> + Send,
        <T::ResponseBody as Body>::Data: Into<Bytes> + Send,
    {
        pub fn new(inner: T) -> Self {
            let inner = tonic::client::Grpc::new(inner);
            Self { inner }
        }

        pub async fn create_client(
            &mut self,
            request: impl tonic::IntoRequest<super::CreateClientReq>,
        ) -> Result<tonic::Response<super::CreateClientResp>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = tonic::codegen::http::uri::PathAndQuery::from_static("/api.Dex/CreateClient");
            self.inner.unary(request.into_request(), path, codec).await
        }

        pub async fn delete_client(
            &mut self,
            request: impl tonic::IntoRequest<super::DeleteClientReq>,
        ) -> Result<tonic::Response<super::DeleteClientResp>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = tonic::codegen::http::uri::PathAndQuery::from_static("/api.Dex/DeleteClient");
            self.inner.unary(request.into_request(), path, codec).await
        }

        pub async fn list_clients(
            &mut self,
            request: impl tonic::IntoRequest<super::ListClientReq>,
        ) -> Result<tonic::Response<super::ListClientResp>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = tonic::codegen::http::uri::PathAndQuery::from_static("/api.Dex/ListClients");
            self.inner.unary(request.into_request(), path, codec).await
        }
    }
}

pub mod dex_server {
    #![allow(clippy::derive_partial_eq_without_eq)]
    use tonic::codegen::*;

    #[tonic::async_trait]
    pub trait Dex: Send + Sync + 'static {
        async fn create_client(
            &self,
            request: tonic::Request<super::CreateClientReq>,
        ) -> Result<tonic::Response<super::CreateClientResp>, tonic::Status>;
        async fn delete_client(
            &self,
            request: tonic::Request<super::DeleteClientReq>,
        ) -> Result<tonic::Response<super::DeleteClientResp>, tonic::Status>;
        async fn list_clients(
            &self,
            request: tonic::Request<super::ListClientReq>,
        ) -> Result<tonic::Response<super::ListClientResp>, tonic::Status>;
    }

    #[derive(Debug)]
    pub struct DexServer<T: Dex> {
        inner: Arc<T>,
    }

    impl<T: Dex> Clone for DexServer<T> {
        fn clone(&self) -> Self {
            Self {
                inner: self.inner.clone(),
            }
        }
    }

    impl<T: Dex> DexServer<T> {
        pub fn new(inner: T) -> Self {
            Self {
                inner: Arc::new(inner),
            }
        }

        pub fn from_arc(inner: Arc<T>) -> Self {
            Self { inner }
        }
    }

    impl<T: Dex> Service<http::Request<tonic::body::BoxBody>> for DexServer<T> {
        type Response = http::Response<tonic::body::BoxBody>;
        type Error = std::convert::Infallible;
        type Future = BoxFuture<Self::Response, Self::Error>;

        fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn call(&mut self, req: http::Request<tonic::body::BoxBody>) -> Self::Future {
            let inner = self.inner.clone();
            match req.uri().path() {
                "/api.Dex/CreateClient" => {
                    struct CreateClientSvc<T: Dex>(pub Arc<T>);
                    impl<T: Dex> tonic::server::UnaryService<super::CreateClientReq> for CreateClientSvc<T> {
                        type Response = super::CreateClientResp;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::CreateClientReq>,
                        ) -> Self::Future {
                            let inner = self.0.clone();
                            Box::pin(async move { inner.create_client(request).await })
                        }
                    }
                    Box::pin(async move {
                        let method = CreateClientSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = tonic::server::Grpc::new(codec);
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    })
                }
                "/api.Dex/DeleteClient" => {
                    struct DeleteClientSvc<T: Dex>(pub Arc<T>);
                    impl<T: Dex> tonic::server::UnaryService<super::DeleteClientReq> for DeleteClientSvc<T> {
                        type Response = super::DeleteClientResp;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::DeleteClientReq>,
                        ) -> Self::Future {
                            let inner = self.0.clone();
                            Box::pin(async move { inner.delete_client(request).await })
                        }
                    }
                    Box::pin(async move {
                        let method = DeleteClientSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = tonic::server::Grpc::new(codec);
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    })
                }
                "/api.Dex/ListClients" => {
                    struct ListClientsSvc<T: Dex>(pub Arc<T>);
                    impl<T: Dex> tonic::server::UnaryService<super::ListClientReq> for ListClientsSvc<T> {
                        type Response = super::ListClientResp;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::ListClientReq>,
                        ) -> Self::Future {
                            let inner = self.0.clone();
                            Box::pin(async move { inner.list_clients(request).await })
                        }
                    }
                    Box::pin(async move {
                        let method = ListClientsSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = tonic::server::Grpc::new(codec);
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    })
                }
                _ => Box::pin(async move {
                    Ok(http::Response::builder()
                        .status(200)
                        .header("grpc-status", "12")
                        .header("content-type", "application/grpc")
                        .body(tonic::body::empty_body())
                        .unwrap())
                }),
            }
        }
    }

    impl<T: Dex> tonic::server::NamedService for DexServer<T> {
        const NAME: &'static str = "api.Dex";
    }
}
