use crate::error::Error;
use crate::resolver::{QueryType, ResolutionOutcome, ResolutionQuery, Resolver};
use std::net::Ipv4Addr;
use tracing::error;
use trust_dns_server::authority::MessageResponseBuilder;
use trust_dns_server::proto::op::{Header, MessageType, OpCode, ResponseCode};
use trust_dns_server::proto::rr::{RData, Record, RecordType};
use trust_dns_server::server::{Request, RequestHandler, ResponseHandler, ResponseInfo};

/// Answers every request from a [`Resolver`].
#[derive(Clone)]
pub struct Handler {
    resolver: Resolver,
}

impl Handler {
    #[must_use]
    pub fn new(resolver: Resolver) -> Self {
        Handler { resolver }
    }

    async fn dispatch_request<R: ResponseHandler>(
        &self,
        request: &Request,
        response: R,
    ) -> Result<ResponseInfo, Error> {
        // If it isn't a query, return NOTIMPL.
        if request.op_code() != OpCode::Query || request.message_type() != MessageType::Query {
            return self.handle_notimpl(request, response).await;
        }

        match self.resolver.resolve(&Self::resolution_query(request)) {
            ResolutionOutcome::Answered { addresses, ttl } => {
                self.send_auth_resp(request, response, &addresses, ttl)
                    .await
            }
            ResolutionOutcome::EmptyResult
            | ResolutionOutcome::OutOfDomain
            | ResolutionOutcome::UnsupportedType => self.send_nxdomain(request, response).await,
        }
    }

    fn resolution_query(request: &Request) -> ResolutionQuery {
        // The original name keeps the client's case; job IDs are case-sensitive.
        let query = request.query().original();
        let record_type = match query.query_type() {
            RecordType::A => QueryType::A,
            other => QueryType::Other(u16::from(other)),
        };
        ResolutionQuery {
            name: query.name().to_string(),
            record_type,
            client: request.src().ip(),
        }
    }

    async fn handle_notimpl<R: ResponseHandler>(
        &self,
        request: &Request,
        mut response_handle: R,
    ) -> Result<ResponseInfo, Error> {
        let response = MessageResponseBuilder::from_message_request(request);
        Ok(response_handle
            .send_response(response.error_msg(request.header(), ResponseCode::NotImp))
            .await?)
    }

    async fn send_auth_resp<R: ResponseHandler>(
        &self,
        request: &Request,
        mut response_handle: R,
        addresses: &[Ipv4Addr],
        ttl: u32,
    ) -> Result<ResponseInfo, Error> {
        let name = request.query().original().name();
        let records: Vec<Record> = addresses
            .iter()
            .map(|ip| Record::from_rdata(name.clone(), ttl, RData::A(*ip)))
            .collect();
        let mut header = Header::response_from_request(request.header());
        header.set_authoritative(true);
        let builder = MessageResponseBuilder::from_message_request(request);
        let response = builder.build(header, records.iter(), &[], &[], &[]);
        Ok(response_handle.send_response(response).await?)
    }

    async fn send_nxdomain<R: ResponseHandler>(
        &self,
        request: &Request,
        mut response_handle: R,
    ) -> Result<ResponseInfo, Error> {
        let builder = MessageResponseBuilder::from_message_request(request);
        let mut header = Header::response_from_request(request.header());
        header.set_authoritative(true);
        header.set_response_code(ResponseCode::NXDomain);
        let response = builder.build_no_records(header);
        Ok(response_handle.send_response(response).await?)
    }
}

#[async_trait::async_trait]
impl RequestHandler for Handler {
    async fn handle_request<R: ResponseHandler>(
        &self,
        request: &Request,
        response_handle: R,
    ) -> ResponseInfo {
        match self.dispatch_request(request, response_handle).await {
            Ok(info) => info,
            Err(error) => {
                error!("error in RequestHandler: {:?}", error);
                let mut header = Header::new();
                header.set_response_code(ResponseCode::ServFail);
                header.into()
            }
        }
    }
}
