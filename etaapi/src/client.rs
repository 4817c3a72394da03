use std::time::Duration;

use indexmap::IndexMap;
use log::{debug, error, info};

use crate::api::{self, HttpTransport, Transport};
use crate::error::{EtaError, Result};
use crate::eta_xml;
use crate::nodes::{EtaNode, Reading, Variable, VariableList};

/// A connection to an ETA heating system. Only exists for controllers that
/// speak a supported REST api version.
pub struct EtaClient {
    base_url: String,
    hide_io_variables: bool,
    api_version: String,
    transport: Box<dyn Transport>,
}

/// Configures and connects an [`EtaClient`].
pub struct EtaClientBuilder {
    host: String,
    hide_io_variables: bool,
    timeout: Option<Duration>,
    transport: Option<Box<dyn Transport>>,
}

impl EtaClientBuilder {
    /// When enabled (the default), I/O interface points are left out of
    /// [`EtaClient::get_nodes`].
    pub fn hide_io_variables(mut self, hide: bool) -> Self {
        self.hide_io_variables = hide;
        self
    }

    /// Timeout for each single HTTP request. Ignored when a custom transport
    /// is set.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Box::new(transport));
        self
    }

    /// Checks the api version of the controller and returns the connected
    /// client.
    pub fn connect(self) -> Result<EtaClient> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => Box::new(HttpTransport::new(self.timeout)?),
        };
        let base_url = api::base_url(&self.host);
        let api_version = check_compatibility(transport.as_ref(), &base_url)?;
        info!("Initialized ETAtouch REST connection to {}", self.host);
        Ok(EtaClient {
            base_url,
            hide_io_variables: self.hide_io_variables,
            api_version,
            transport,
        })
    }
}

fn check_compatibility(transport: &dyn Transport, base_url: &str) -> Result<String> {
    let url = format!("{}{}", base_url, api::API_VERSION_PATH);
    let xml = api::request(transport, &url)?;
    let api = eta_xml::parse_api_version(&xml)?;

    if !(api.tag.ends_with("api") && api::SUPPORTED_API_VERSIONS.contains(&api.version.as_str())) {
        error!(
            "Detected api version: {:?} Supported versions: {:?}",
            api.version,
            api::SUPPORTED_API_VERSIONS
        );
        return Err(EtaError::UnsupportedApiVersion {
            detected: api.version,
            supported: api::SUPPORTED_API_VERSIONS,
        });
    }
    info!("Detected ETAtouch REST api version: {}", api.version);
    Ok(api.version)
}

impl EtaClient {
    pub fn builder(host: impl ToString) -> EtaClientBuilder {
        EtaClientBuilder {
            host: host.to_string(),
            hide_io_variables: true,
            timeout: None,
            transport: None,
        }
    }

    /// Connects to `host` with I/O variables hidden.
    pub fn connect(host: impl ToString) -> Result<Self> {
        Self::builder(host).connect()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    pub fn hides_io_variables(&self) -> bool {
        self.hide_io_variables
    }

    /// Returns the top level nodes (the tabs of the ETAtouch display) with all
    /// their variables. The variables carry no values yet, see
    /// [`EtaClient::update`].
    pub fn get_nodes(&self) -> Result<IndexMap<String, VariableList>> {
        let url = format!("{}{}", self.base_url, api::MENU_PATH);
        let xml = api::request(self.transport.as_ref(), &url)?;
        eta_xml::parse_menu(&xml, self.hide_io_variables)
    }

    /// Fetches fresh values for a variable or for every variable below a list.
    pub fn update(&self, node: &mut EtaNode) -> Result<()> {
        match node {
            EtaNode::Variable(var) => self.update_variable(var),
            EtaNode::List(list) => self.update_list(list),
        }
    }

    pub fn update_variable(&self, var: &mut Variable) -> Result<()> {
        debug!("Update value of {} ({})", var.name(), var.uri());
        let reading = self.fetch_reading(var.uri()).map_err(|err| EtaError::UpdateFailed {
            uri: var.uri().to_string(),
            source: Box::new(err),
        })?;
        var.set_reading(reading);
        Ok(())
    }

    /// Updates the children one after another. Stops at the first failing
    /// variable, the ones before it keep their new values.
    pub fn update_list(&self, list: &mut VariableList) -> Result<()> {
        for node in list.elements_mut() {
            self.update(node)?;
        }
        Ok(())
    }

    fn fetch_reading(&self, uri: &str) -> Result<Reading> {
        let url = api::variable_url(&self.base_url, uri);
        let xml = api::request(self.transport.as_ref(), &url)?;
        eta_xml::parse_variable(&xml)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    use super::*;
    use crate::api::Response;
    use crate::nodes::VariableType;

    const HOST: &str = "heizung";
    const BASE: &str = "http://heizung:8080";

    const MENU: &str = r##"<?xml version="1.0" encoding="utf-8"?>
<eta version="1.0" xmlns="http://www.eta.co.at/rest/v1">
  <menu uri="/user/menu">
    <fub uri="/112/10021" name="Kessel">
      <object uri="/112/10021/0/0/12011" name="Zählerstände">
        <object uri="/112/10021/0/0/12153" name="Volllaststunden"/>
        <object uri="/112/10021/0/0/12016" name="Gesamtverbrauch"/>
        <object uri="/112/10021/0/0/12017" name="Asche"/>
      </object>
      <object uri="/112/10021/0/0/10123" name="Eingang 1"/>
    </fub>
  </menu>
</eta>"##;

    /// Answers from a fixed url table and records every requested url.
    #[derive(Clone, Default)]
    struct ScriptedTransport {
        responses: Rc<RefCell<HashMap<String, (u16, String)>>>,
        requests: Rc<RefCell<Vec<String>>>,
    }

    impl ScriptedTransport {
        fn respond(&self, path: &str, status: u16, body: &str) {
            self.responses
                .borrow_mut()
                .insert(format!("{}{}", BASE, path), (status, body.to_string()));
        }

        fn requests(&self) -> Vec<String> {
            self.requests.borrow().clone()
        }
    }

    impl Transport for ScriptedTransport {
        fn get(&self, url: &str) -> Result<Response> {
            self.requests.borrow_mut().push(url.to_string());
            let (status, body) = self
                .responses
                .borrow()
                .get(url)
                .cloned()
                .unwrap_or((404, "not found".to_string()));
            Ok(Response {
                status,
                url: url.to_string(),
                body,
            })
        }
    }

    fn api_xml(version: &str) -> String {
        format!(
            r#"<eta version="1.0" xmlns="http://www.eta.co.at/rest/v1"><api version="{}" uri="/user/api"/></eta>"#,
            version
        )
    }

    fn var_xml(value: &str, str_value: &str, unit: &str, scale: i64, adv_text_offset: i64) -> String {
        format!(
            r#"<eta version="1.0"><value strValue="{}" unit="{}" decPlaces="0" scaleFactor="{}" advTextOffset="{}">{}</value></eta>"#,
            str_value, unit, scale, adv_text_offset, value
        )
    }

    fn connected() -> (ScriptedTransport, EtaClient) {
        let transport = ScriptedTransport::default();
        transport.respond("/user/api", 200, &api_xml("1.2"));
        transport.respond("/user/menu", 200, MENU);
        let client = EtaClient::builder(HOST)
            .transport(transport.clone())
            .connect()
            .unwrap();
        (transport, client)
    }

    #[test]
    fn connect_with_supported_version() {
        let (transport, client) = connected();
        assert_eq!(client.api_version(), "1.2");
        assert_eq!(client.base_url(), BASE);
        assert!(client.hides_io_variables());
        assert_eq!(transport.requests(), vec![format!("{}/user/api", BASE)]);
    }

    #[test]
    fn connect_with_unsupported_version_fails() {
        let transport = ScriptedTransport::default();
        transport.respond("/user/api", 200, &api_xml("2.0"));
        let result = EtaClient::builder(HOST).transport(transport.clone()).connect();
        match result {
            Err(EtaError::UnsupportedApiVersion { detected, .. }) => assert_eq!(detected, "2.0"),
            Err(err) => panic!("unexpected error {:?}", err),
            Ok(_) => panic!("connected to unsupported api"),
        }
        // nothing but the version was requested
        assert_eq!(transport.requests().len(), 1);
    }

    #[test]
    fn connect_requires_api_tag() {
        let transport = ScriptedTransport::default();
        transport.respond("/user/api", 200, r#"<eta><menu version="1.2"/></eta>"#);
        let result = EtaClient::builder(HOST).transport(transport).connect();
        assert!(matches!(result, Err(EtaError::UnsupportedApiVersion { .. })));
    }

    #[test]
    fn connect_fails_on_http_error() {
        let transport = ScriptedTransport::default();
        transport.respond("/user/api", 500, "internal error");
        let result = EtaClient::builder(HOST).transport(transport).connect();
        assert!(matches!(
            result,
            Err(EtaError::ApiRequest { status: 500, .. })
        ));
    }

    #[test]
    fn get_nodes_hides_io_variables() {
        let (_, client) = connected();
        let nodes = client.get_nodes().unwrap();
        let kessel = &nodes["Kessel"];
        assert_eq!(kessel.len(), 1);
        assert_eq!(kessel.list("Zählerstände").unwrap().len(), 3);
    }

    #[test]
    fn get_nodes_with_io_variables() {
        let transport = ScriptedTransport::default();
        transport.respond("/user/api", 200, &api_xml("1.0"));
        transport.respond("/user/menu", 200, MENU);
        let client = EtaClient::builder(HOST)
            .hide_io_variables(false)
            .transport(transport)
            .connect()
            .unwrap();
        let nodes = client.get_nodes().unwrap();
        assert!(nodes["Kessel"].variable("Eingang 1").is_some());
    }

    #[test]
    fn update_single_variable() {
        let (transport, client) = connected();
        transport.respond(
            "/user/var/112/10021/0/0/12153",
            200,
            &var_xml("123456.0", "12345,6", "h", 10, 0),
        );
        let mut nodes = client.get_nodes().unwrap();
        let mut node = nodes["Kessel"]
            .find_mut("Zählerstände/Volllaststunden")
            .unwrap();
        node.update(&client).unwrap();

        let var = node.as_variable().unwrap();
        assert_eq!(var.value(), Some(123456));
        assert_eq!(var.str_value(), Some("12345,6"));
        assert_eq!(var.unit(), "h");
        assert_eq!(var.scale_factor(), 10);
        assert_eq!(var.variable_type(), Some(VariableType::Default));
        assert_eq!(var.normalized_value(), Some(12345.6));
        assert!(var.last_updated().is_some());
    }

    #[test]
    fn update_twice_is_idempotent() {
        let (transport, client) = connected();
        transport.respond(
            "/user/var/112/10021/0/0/12016",
            200,
            &var_xml("5", "Automatic", "", 1, 5),
        );
        let mut var = Variable::new("Gesamtverbrauch", "/112/10021/0/0/12016");
        client.update_variable(&mut var).unwrap();
        let first = var.reading().unwrap().clone();
        client.update_variable(&mut var).unwrap();
        let second = var.reading().unwrap();

        assert_eq!(first.value, second.value);
        assert_eq!(first.str_value, second.str_value);
        assert_eq!(first.unit, second.unit);
        assert_eq!(first.scale_factor, second.scale_factor);
        assert_eq!(first.dec_places, second.dec_places);
        assert_eq!(first.variable_type, VariableType::Text);
        assert_eq!(first.variable_type, second.variable_type);
        assert!(second.last_updated >= first.last_updated);
    }

    #[test]
    fn group_update_stops_at_first_failure() {
        let (transport, client) = connected();
        transport.respond(
            "/user/var/112/10021/0/0/12153",
            200,
            &var_xml("10", "1", "h", 10, 0),
        );
        transport.respond("/user/var/112/10021/0/0/12016", 503, "busy");
        transport.respond(
            "/user/var/112/10021/0/0/12017",
            200,
            &var_xml("20", "2", "kg", 10, 0),
        );

        let mut nodes = client.get_nodes().unwrap();
        let mut counters = nodes["Kessel"].find_mut("Zählerstände").unwrap();
        let err = counters.update(&client).unwrap_err();

        match &err {
            EtaError::UpdateFailed { uri, source } => {
                assert_eq!(uri, "/112/10021/0/0/12016");
                assert!(matches!(**source, EtaError::ApiRequest { status: 503, .. }));
            }
            err => panic!("unexpected error {:?}", err),
        }
        assert!(matches!(err.root_cause(), EtaError::ApiRequest { .. }));

        let counters = counters.into_ref().as_list().unwrap();
        assert!(counters.variable("Volllaststunden").unwrap().is_updated());
        assert!(!counters.variable("Gesamtverbrauch").unwrap().is_updated());
        assert!(!counters.variable("Asche").unwrap().is_updated());

        let asche = format!("{}/user/var/112/10021/0/0/12017", BASE);
        assert!(!transport.requests().contains(&asche));
    }

    #[test]
    fn group_update_updates_all_in_order() {
        let (transport, client) = connected();
        for uri in ["12153", "12016", "12017"] {
            transport.respond(
                &format!("/user/var/112/10021/0/0/{}", uri),
                200,
                &var_xml("06", "06:00 - 22:00 80", "", 1, 0),
            );
        }
        let mut nodes = client.get_nodes().unwrap();
        let kessel = nodes.get_mut("Kessel").unwrap();
        client.update_list(kessel).unwrap();

        assert!(kessel
            .variables()
            .iter()
            .all(|var| var.variable_type() == Some(VariableType::Timeslot)));
        let requested: Vec<_> = transport.requests().into_iter().skip(2).collect();
        assert_eq!(
            requested,
            vec![
                format!("{}/user/var/112/10021/0/0/12153", BASE),
                format!("{}/user/var/112/10021/0/0/12016", BASE),
                format!("{}/user/var/112/10021/0/0/12017", BASE),
            ]
        );
    }
}
