use super::template::AttributeKind;

/// Standard RADIUS attribute types (RFC 2865, 2866, 2869, 3579)
///
/// Used to seed [`MemoryDictionary::standard`](crate::dictionary::MemoryDictionary::standard)
/// and as readable constants when building packets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AttributeType {
    UserName = 1,
    UserPassword = 2,
    ChapPassword = 3,
    NasIpAddress = 4,
    NasPort = 5,
    ServiceType = 6,
    FramedProtocol = 7,
    FramedIpAddress = 8,
    FramedIpNetmask = 9,
    FramedRouting = 10,
    FilterId = 11,
    FramedMtu = 12,
    FramedCompression = 13,
    LoginIpHost = 14,
    LoginService = 15,
    LoginTcpPort = 16,
    ReplyMessage = 18,
    CallbackNumber = 19,
    CallbackId = 20,
    FramedRoute = 22,
    FramedIpxNetwork = 23,
    State = 24,
    Class = 25,
    VendorSpecific = 26,
    SessionTimeout = 27,
    IdleTimeout = 28,
    TerminationAction = 29,
    CalledStationId = 30,
    CallingStationId = 31,
    NasIdentifier = 32,
    ProxyState = 33,
    LoginLatService = 34,
    LoginLatNode = 35,
    LoginLatGroup = 36,
    FramedAppleTalkLink = 37,
    FramedAppleTalkNetwork = 38,
    FramedAppleTalkZone = 39,
    /// RFC 2866
    AcctStatusType = 40,
    AcctDelayTime = 41,
    AcctInputOctets = 42,
    AcctOutputOctets = 43,
    AcctSessionId = 44,
    AcctAuthentic = 45,
    AcctSessionTime = 46,
    AcctInputPackets = 47,
    AcctOutputPackets = 48,
    AcctTerminateCause = 49,
    AcctMultiSessionId = 50,
    AcctLinkCount = 51,
    /// RFC 2869, high 32 bits of the 64-bit Acct-Input-Octets counter
    AcctInputGigawords = 52,
    /// RFC 2869, high 32 bits of the 64-bit Acct-Output-Octets counter
    AcctOutputGigawords = 53,
    ChapChallenge = 60,
    NasPortType = 61,
    PortLimit = 62,
    LoginLatPort = 63,
    /// RFC 3579
    EapMessage = 79,
    /// RFC 2869
    MessageAuthenticator = 80,
}

impl AttributeType {
    /// Every known type, in numeric order
    pub const ALL: [AttributeType; 57] = [
        AttributeType::UserName,
        AttributeType::UserPassword,
        AttributeType::ChapPassword,
        AttributeType::NasIpAddress,
        AttributeType::NasPort,
        AttributeType::ServiceType,
        AttributeType::FramedProtocol,
        AttributeType::FramedIpAddress,
        AttributeType::FramedIpNetmask,
        AttributeType::FramedRouting,
        AttributeType::FilterId,
        AttributeType::FramedMtu,
        AttributeType::FramedCompression,
        AttributeType::LoginIpHost,
        AttributeType::LoginService,
        AttributeType::LoginTcpPort,
        AttributeType::ReplyMessage,
        AttributeType::CallbackNumber,
        AttributeType::CallbackId,
        AttributeType::FramedRoute,
        AttributeType::FramedIpxNetwork,
        AttributeType::State,
        AttributeType::Class,
        AttributeType::VendorSpecific,
        AttributeType::SessionTimeout,
        AttributeType::IdleTimeout,
        AttributeType::TerminationAction,
        AttributeType::CalledStationId,
        AttributeType::CallingStationId,
        AttributeType::NasIdentifier,
        AttributeType::ProxyState,
        AttributeType::LoginLatService,
        AttributeType::LoginLatNode,
        AttributeType::LoginLatGroup,
        AttributeType::FramedAppleTalkLink,
        AttributeType::FramedAppleTalkNetwork,
        AttributeType::FramedAppleTalkZone,
        AttributeType::AcctStatusType,
        AttributeType::AcctDelayTime,
        AttributeType::AcctInputOctets,
        AttributeType::AcctOutputOctets,
        AttributeType::AcctSessionId,
        AttributeType::AcctAuthentic,
        AttributeType::AcctSessionTime,
        AttributeType::AcctInputPackets,
        AttributeType::AcctOutputPackets,
        AttributeType::AcctTerminateCause,
        AttributeType::AcctMultiSessionId,
        AttributeType::AcctLinkCount,
        AttributeType::AcctInputGigawords,
        AttributeType::AcctOutputGigawords,
        AttributeType::ChapChallenge,
        AttributeType::NasPortType,
        AttributeType::PortLimit,
        AttributeType::LoginLatPort,
        AttributeType::EapMessage,
        AttributeType::MessageAuthenticator,
    ];

    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.as_u8() == value)
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Dictionary name, as used in FreeRADIUS-style dictionaries
    pub fn name(self) -> &'static str {
        match self {
            AttributeType::UserName => "User-Name",
            AttributeType::UserPassword => "User-Password",
            AttributeType::ChapPassword => "CHAP-Password",
            AttributeType::NasIpAddress => "NAS-IP-Address",
            AttributeType::NasPort => "NAS-Port",
            AttributeType::ServiceType => "Service-Type",
            AttributeType::FramedProtocol => "Framed-Protocol",
            AttributeType::FramedIpAddress => "Framed-IP-Address",
            AttributeType::FramedIpNetmask => "Framed-IP-Netmask",
            AttributeType::FramedRouting => "Framed-Routing",
            AttributeType::FilterId => "Filter-Id",
            AttributeType::FramedMtu => "Framed-MTU",
            AttributeType::FramedCompression => "Framed-Compression",
            AttributeType::LoginIpHost => "Login-IP-Host",
            AttributeType::LoginService => "Login-Service",
            AttributeType::LoginTcpPort => "Login-TCP-Port",
            AttributeType::ReplyMessage => "Reply-Message",
            AttributeType::CallbackNumber => "Callback-Number",
            AttributeType::CallbackId => "Callback-Id",
            AttributeType::FramedRoute => "Framed-Route",
            AttributeType::FramedIpxNetwork => "Framed-IPX-Network",
            AttributeType::State => "State",
            AttributeType::Class => "Class",
            AttributeType::VendorSpecific => "Vendor-Specific",
            AttributeType::SessionTimeout => "Session-Timeout",
            AttributeType::IdleTimeout => "Idle-Timeout",
            AttributeType::TerminationAction => "Termination-Action",
            AttributeType::CalledStationId => "Called-Station-Id",
            AttributeType::CallingStationId => "Calling-Station-Id",
            AttributeType::NasIdentifier => "NAS-Identifier",
            AttributeType::ProxyState => "Proxy-State",
            AttributeType::LoginLatService => "Login-LAT-Service",
            AttributeType::LoginLatNode => "Login-LAT-Node",
            AttributeType::LoginLatGroup => "Login-LAT-Group",
            AttributeType::FramedAppleTalkLink => "Framed-AppleTalk-Link",
            AttributeType::FramedAppleTalkNetwork => "Framed-AppleTalk-Network",
            AttributeType::FramedAppleTalkZone => "Framed-AppleTalk-Zone",
            AttributeType::AcctStatusType => "Acct-Status-Type",
            AttributeType::AcctDelayTime => "Acct-Delay-Time",
            AttributeType::AcctInputOctets => "Acct-Input-Octets",
            AttributeType::AcctOutputOctets => "Acct-Output-Octets",
            AttributeType::AcctSessionId => "Acct-Session-Id",
            AttributeType::AcctAuthentic => "Acct-Authentic",
            AttributeType::AcctSessionTime => "Acct-Session-Time",
            AttributeType::AcctInputPackets => "Acct-Input-Packets",
            AttributeType::AcctOutputPackets => "Acct-Output-Packets",
            AttributeType::AcctTerminateCause => "Acct-Terminate-Cause",
            AttributeType::AcctMultiSessionId => "Acct-Multi-Session-Id",
            AttributeType::AcctLinkCount => "Acct-Link-Count",
            AttributeType::AcctInputGigawords => "Acct-Input-Gigawords",
            AttributeType::AcctOutputGigawords => "Acct-Output-Gigawords",
            AttributeType::ChapChallenge => "CHAP-Challenge",
            AttributeType::NasPortType => "NAS-Port-Type",
            AttributeType::PortLimit => "Port-Limit",
            AttributeType::LoginLatPort => "Login-LAT-Port",
            AttributeType::EapMessage => "EAP-Message",
            AttributeType::MessageAuthenticator => "Message-Authenticator",
        }
    }

    /// Data kind of the value octets
    pub fn kind(self) -> AttributeKind {
        use AttributeType::*;
        match self {
            NasIpAddress | FramedIpAddress | FramedIpNetmask | LoginIpHost => AttributeKind::IpAddr,
            NasPort | ServiceType | FramedProtocol | FramedRouting | FramedMtu
            | FramedCompression | LoginService | LoginTcpPort | FramedIpxNetwork
            | SessionTimeout | IdleTimeout | TerminationAction | FramedAppleTalkLink
            | FramedAppleTalkNetwork | AcctStatusType | AcctDelayTime | AcctInputOctets
            | AcctOutputOctets | AcctAuthentic | AcctSessionTime | AcctInputPackets
            | AcctOutputPackets | AcctTerminateCause | AcctLinkCount | AcctInputGigawords
            | AcctOutputGigawords | NasPortType | PortLimit => AttributeKind::Integer,
            UserName | FilterId | ReplyMessage | CallbackNumber | CallbackId | FramedRoute
            | CalledStationId | CallingStationId | NasIdentifier | LoginLatService
            | LoginLatNode | LoginLatPort | FramedAppleTalkZone | AcctSessionId
            | AcctMultiSessionId => AttributeKind::String,
            VendorSpecific => AttributeKind::VendorSpecific,
            UserPassword | ChapPassword | State | Class | ProxyState | LoginLatGroup
            | ChapChallenge | EapMessage | MessageAuthenticator => AttributeKind::Octets,
        }
    }
}
